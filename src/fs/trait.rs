//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// The handful of file operations repository detection needs.
///
/// Every method reports failures instead of hiding them; callers decide
/// whether an error means "absent" or "skip this file".
pub trait FileSystem: Send + Sync {
    /// Check whether a path exists, surfacing permission and I/O errors
    fn try_exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Existence check that treats any error as "not there"
    fn exists(&self, path: &Path) -> bool {
        self.try_exists(path).unwrap_or(false)
    }
}
