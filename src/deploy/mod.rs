//! From detected settings to a dispatched Nomad job.

pub mod config;
pub mod dispatch;
pub mod naming;
pub mod orchestrator;

pub use config::{DeploymentConfig, DeploymentConfigBuilder};
pub use dispatch::{DispatchAdapter, JobTemplate};
pub use naming::{is_valid_slug, sanitize_app_name};
pub use orchestrator::{
    BatchItem, BatchOrchestrator, DispatchResult, PipelineError, PipelineStage,
};
