use super::FileSystem;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn try_exists(&self, path: &Path) -> Result<bool> {
        path.try_exists()
            .context(format!("Failed to check existence of {:?}", path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name":"demo"}"#).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        dir
    }

    #[test]
    fn test_try_exists() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.try_exists(&temp.path().join("package.json")).unwrap());
        assert!(fs.try_exists(&temp.path().join("src")).unwrap());
        assert!(!fs.try_exists(&temp.path().join("go.mod")).unwrap());
    }

    #[test]
    fn test_read_to_string() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let content = fs.read_to_string(&temp.path().join("package.json")).unwrap();
        assert_eq!(content, r#"{"name":"demo"}"#);
    }

    #[test]
    fn test_read_missing_file_errors() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let err = fs
            .read_to_string(&temp.path().join("Dockerfile"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_read_directory_errors() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.read_to_string(&temp.path().join("src")).is_err());
    }
}
