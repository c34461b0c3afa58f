//! Batch deployment pipeline.
//!
//! Each slug goes through clone, analysis, config building, persistence and
//! dispatch on its own. A failure ends that slug's run with an error result;
//! the next slug starts from scratch regardless.

use super::config::{DeploymentConfig, DeploymentConfigBuilder};
use super::dispatch::DispatchAdapter;
use super::naming::is_valid_slug;
use crate::clients::{ClientError, CloneError, KvStore, RepositoryCloner, Scheduler};
use crate::detection::{AppTypeDetector, RepositoryAnalyzer};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where a slug is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Pending,
    Cloning,
    Analyzing,
    Configuring,
    Persisting,
    Dispatching,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Pending => "pending",
            PipelineStage::Cloning => "cloning",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::Configuring => "configuring",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Dispatching => "dispatching",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-slug failure. Stage errors are carried unchanged so the result shows
/// the collaborator's own message.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid repository slug '{0}': expected owner/repo")]
    InvalidSlug(String),

    #[error(transparent)]
    Clone(#[from] CloneError),

    #[error(transparent)]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Persist(ClientError),

    #[error(transparent)]
    Dispatch(ClientError),
}

/// Outcome for one slug, tagged by `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchResult {
    Deployed {
        slug: String,
        #[serde(rename = "appName")]
        app_name: String,
        #[serde(rename = "jobId")]
        job_id: String,
        url: String,
    },
    Error {
        slug: String,
        error: String,
    },
}

impl DispatchResult {
    pub fn slug(&self) -> &str {
        match self {
            DispatchResult::Deployed { slug, .. } | DispatchResult::Error { slug, .. } => slug,
        }
    }

    pub fn is_deployed(&self) -> bool {
        matches!(self, DispatchResult::Deployed { .. })
    }
}

/// One entry of a deployment batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItem {
    Slug(String),
    /// A request element that was not a string, kept as its JSON text for
    /// the error result. It is never cloned.
    Malformed(String),
}

impl BatchItem {
    pub fn as_str(&self) -> &str {
        match self {
            BatchItem::Slug(s) | BatchItem::Malformed(s) => s,
        }
    }
}

impl From<String> for BatchItem {
    fn from(slug: String) -> Self {
        BatchItem::Slug(slug)
    }
}

/// Runs the deployment pipeline for a batch of slugs, one at a time
pub struct BatchOrchestrator {
    cloner: Arc<dyn RepositoryCloner>,
    fs: Arc<dyn FileSystem>,
    kv: Arc<dyn KvStore>,
    dispatcher: DispatchAdapter,
}

impl BatchOrchestrator {
    pub fn new(
        cloner: Arc<dyn RepositoryCloner>,
        fs: Arc<dyn FileSystem>,
        kv: Arc<dyn KvStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            cloner,
            fs,
            kv,
            dispatcher: DispatchAdapter::new(scheduler),
        }
    }

    /// One result per slug, in input order. Never stops early.
    pub async fn run(&self, slugs: &[String]) -> Vec<DispatchResult> {
        let items: Vec<BatchItem> = slugs.iter().cloned().map(BatchItem::Slug).collect();
        self.run_items(&items).await
    }

    /// Like [`run`](Self::run); malformed items resolve to an error result
    /// without touching any collaborator.
    pub async fn run_items(&self, items: &[BatchItem]) -> Vec<DispatchResult> {
        info!(count = items.len(), "Starting deployment batch");

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let result = match item {
                BatchItem::Slug(slug) => self.deploy(slug).await,
                BatchItem::Malformed(text) => reject(text),
            };
            results.push(result);
        }

        let deployed = results.iter().filter(|r| r.is_deployed()).count();
        info!(
            deployed,
            failed = results.len() - deployed,
            "Deployment batch finished"
        );
        results
    }

    /// Run the full pipeline for one slug and resolve it to a result
    pub async fn deploy(&self, slug: &str) -> DispatchResult {
        info!(slug, "Processing repository");

        let mut stage = PipelineStage::Pending;
        match self.run_pipeline(slug, &mut stage).await {
            Ok((config, job_id)) => DispatchResult::Deployed {
                slug: slug.to_string(),
                url: config.url(),
                app_name: config.app_name,
                job_id,
            },
            Err(e) => {
                let failed_at = stage;
                advance(slug, &mut stage, PipelineStage::Failed);
                warn!(slug, stage = %failed_at, error = %e, "Deployment failed");
                DispatchResult::Error {
                    slug: slug.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn run_pipeline(
        &self,
        slug: &str,
        stage: &mut PipelineStage,
    ) -> Result<(DeploymentConfig, String), PipelineError> {
        if !is_valid_slug(slug) {
            return Err(PipelineError::InvalidSlug(slug.to_string()));
        }

        advance(slug, stage, PipelineStage::Cloning);
        let checkout = self.cloner.clone_repository(slug).await?;

        advance(slug, stage, PipelineStage::Analyzing);
        let analysis = RepositoryAnalyzer::new(self.fs.as_ref()).analyze(&checkout);
        let app_type = AppTypeDetector::new(self.fs.as_ref()).detect(&checkout);

        advance(slug, stage, PipelineStage::Configuring);
        let config = DeploymentConfigBuilder::new(slug, app_type)
            .with_analysis(analysis)
            .build();

        advance(slug, stage, PipelineStage::Persisting);
        let body = serde_json::to_vec(&config)?;
        self.kv
            .put(&config.kv_key(), &body)
            .await
            .map_err(PipelineError::Persist)?;

        advance(slug, stage, PipelineStage::Dispatching);
        let job_id = self
            .dispatcher
            .dispatch(&config)
            .await
            .map_err(PipelineError::Dispatch)?;

        advance(slug, stage, PipelineStage::Done);
        Ok((config, job_id))
    }
}

fn reject(text: &str) -> DispatchResult {
    let error = PipelineError::InvalidSlug(text.to_string());
    warn!(slug = text, stage = %PipelineStage::Pending, error = %error, "Deployment failed");
    DispatchResult::Error {
        slug: text.to_string(),
        error: error.to_string(),
    }
}

fn advance(slug: &str, stage: &mut PipelineStage, next: PipelineStage) {
    debug!(slug, from = %stage, to = %next, "Pipeline stage");
    *stage = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployed_result_shape() {
        let result = DispatchResult::Deployed {
            slug: "acme/web".to_string(),
            app_name: "web".to_string(),
            job_id: "github-app/dispatch-1".to_string(),
            url: "http://web.localhost".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "status": "deployed",
                "slug": "acme/web",
                "appName": "web",
                "jobId": "github-app/dispatch-1",
                "url": "http://web.localhost"
            })
        );
    }

    #[test]
    fn test_error_result_shape() {
        let result = DispatchResult::Error {
            slug: "acme/gone".to_string(),
            error: "Repository not found".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "status": "error",
                "slug": "acme/gone",
                "error": "Repository not found"
            })
        );
        assert_eq!(result.slug(), "acme/gone");
        assert!(!result.is_deployed());
    }

    #[test]
    fn test_stage_errors_keep_their_message() {
        let err = PipelineError::from(CloneError::Rejected("Repository not found".to_string()));
        assert_eq!(err.to_string(), "Repository not found");

        let err = PipelineError::Persist(ClientError::Status {
            service: "consul",
            status: 500,
            body: "No cluster leader".to_string(),
        });
        assert_eq!(err.to_string(), "consul returned 500: No cluster leader");
    }

    #[test]
    fn test_reject_malformed_item() {
        let result = reject(r#"{"x":"a/b"}"#);
        assert_eq!(
            result,
            DispatchResult::Error {
                slug: r#"{"x":"a/b"}"#.to_string(),
                error: r#"invalid repository slug '{"x":"a/b"}': expected owner/repo"#.to_string(),
            }
        );
    }

    #[test]
    fn test_batch_item_text() {
        assert_eq!(BatchItem::from("acme/web".to_string()).as_str(), "acme/web");
        assert_eq!(BatchItem::Malformed("42".to_string()).as_str(), "42");
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::Pending.to_string(), "pending");
        assert_eq!(PipelineStage::Dispatching.to_string(), "dispatching");
        assert_eq!(PipelineStage::Failed.to_string(), "failed");
    }
}
