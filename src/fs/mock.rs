use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory file system for tests.
///
/// Files can be registered as unreadable (they exist but reads fail), and the
/// whole file system can be put into a failing mode where every call errors,
/// which mimics a checkout the process has no permission to inspect.
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, String>>,
    unreadable: RwLock<HashSet<PathBuf>>,
    failing: bool,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            unreadable: RwLock::new(HashSet::new()),
            failing: false,
            root,
        }
    }

    /// A file system on which every operation returns an error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        self.files.write().unwrap().insert(path, content.to_string());
    }

    /// Register a file that exists but cannot be read
    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.files.write().unwrap().insert(path.clone(), String::new());
        self.unreadable.write().unwrap().insert(path);
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn try_exists(&self, path: &Path) -> Result<bool> {
        if self.failing {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        let path = self.normalize_path(path);
        Ok(self.files.read().unwrap().contains_key(&path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        if self.failing {
            return Err(anyhow!("Read error: {:?}", path));
        }
        let path = self.normalize_path(path);
        if self.unreadable.read().unwrap().contains(&path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        self.files
            .read()
            .unwrap()
            .get(&path)
            .cloned()
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }
}
