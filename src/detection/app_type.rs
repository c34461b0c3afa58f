use super::types::AppType;
use crate::fs::FileSystem;
use std::path::Path;
use tracing::debug;

/// Marker files in priority order; the first one present decides.
const MARKERS: [(&str, AppType); 3] = [
    ("package.json", AppType::Node),
    ("requirements.txt", AppType::Python),
    ("go.mod", AppType::Go),
];

/// Classifies a checkout by marker-file presence. Contents are never read.
pub struct AppTypeDetector<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> AppTypeDetector<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn detect(&self, repo_path: &Path) -> AppType {
        for (marker, app_type) in MARKERS {
            match self.fs.try_exists(&repo_path.join(marker)) {
                Ok(true) => {
                    debug!(marker, app_type = %app_type, "Marker file found");
                    return app_type;
                }
                Ok(false) => {}
                Err(e) => debug!(marker, error = %e, "Treating unreadable marker as absent"),
            }
        }

        AppType::Unknown
    }
}
