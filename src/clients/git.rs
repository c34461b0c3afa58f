//! Shallow git checkouts of `owner/repo` slugs

use super::RepositoryCloner;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CloneError {
    #[error("failed to prepare checkout directory {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run git: {0}")]
    Spawn(#[source] io::Error),

    /// git ran and refused; carries git's own message
    #[error("{0}")]
    Rejected(String),
}

/// Clones `<base_url>/<owner>/<repo>.git` into `<repos_dir>/<owner>_<repo>`
pub struct GitCloner {
    repos_dir: PathBuf,
    base_url: String,
}

impl GitCloner {
    pub fn new(repos_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            repos_dir: repos_dir.into(),
            base_url: base_url.into(),
        }
    }

    pub fn checkout_dir(&self, slug: &str) -> PathBuf {
        self.repos_dir.join(slug.replace('/', "_"))
    }

    pub fn remote_url(&self, slug: &str) -> String {
        format!("{}/{}.git", self.base_url.trim_end_matches('/'), slug)
    }

    async fn prepare(&self, checkout: &Path) -> Result<(), CloneError> {
        let workspace_err = |source| CloneError::Workspace {
            path: checkout.to_path_buf(),
            source,
        };

        // git refuses to clone into a non-empty directory
        if fs::try_exists(checkout).await.map_err(workspace_err)? {
            debug!(path = %checkout.display(), "Removing previous checkout");
            fs::remove_dir_all(checkout).await.map_err(workspace_err)?;
        }

        fs::create_dir_all(&self.repos_dir)
            .await
            .map_err(|source| CloneError::Workspace {
                path: self.repos_dir.clone(),
                source,
            })
    }
}

#[async_trait]
impl RepositoryCloner for GitCloner {
    async fn clone_repository(&self, slug: &str) -> Result<PathBuf, CloneError> {
        let checkout = self.checkout_dir(slug);
        let url = self.remote_url(slug);

        self.prepare(&checkout).await?;

        info!(slug, %url, "Cloning repository");
        let output = Command::new("git")
            .args(["clone", "--depth", "1", "--quiet"])
            .arg(&url)
            .arg(&checkout)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(CloneError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("git clone of {} exited with {}", url, output.status)
            } else {
                stderr
            };
            return Err(CloneError::Rejected(message));
        }

        Ok(checkout)
    }
}
