//! slugship - repository-to-Nomad deployment pipeline
//!
//! Takes GitHub `owner/repo` slugs, clones each one, works out what kind of
//! app it is and how to build and run it, stores the resulting
//! [`DeploymentConfig`] in Consul KV and dispatches a parameterized Nomad job.
//!
//! Slugs in a batch are processed one after another and fail independently:
//! the batch result always has one entry per input slug, in input order.
//!
//! # Example Usage
//!
//! ```no_run
//! use slugship::{BatchOrchestrator, RealFileSystem, SlugshipConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SlugshipConfig::default();
//! let orchestrator = BatchOrchestrator::new(
//!     Arc::new(config.git_cloner()),
//!     Arc::new(RealFileSystem::new()),
//!     Arc::new(config.consul_client()?),
//!     Arc::new(config.nomad_client()?),
//! );
//!
//! for result in orchestrator.run(&["acme/web".to_string()]).await {
//!     println!("{}: deployed={}", result.slug(), result.is_deployed());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`detection`]: app type detection and repository analysis
//! - [`deploy`]: config building, job dispatch and the batch pipeline
//! - [`clients`]: git, Consul and Nomad collaborators
//! - [`service`]: request-level deploy, app listing and health
//! - [`cli`]: command-line surface

pub mod cli;
pub mod clients;
pub mod config;
pub mod deploy;
pub mod detection;
pub mod fs;
pub mod service;
pub mod util;

pub use clients::{
    ClientError, CloneError, ConsulClient, GitCloner, KvStore, NomadClient, RepositoryCloner,
    Scheduler,
};
pub use config::{ConfigError, SlugshipConfig};
pub use deploy::{
    BatchOrchestrator, DeploymentConfig, DeploymentConfigBuilder, DispatchResult, PipelineError,
};
pub use detection::{AppType, AppTypeDetector, RepositoryAnalysis, RepositoryAnalyzer};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use service::{AppsResponse, DeployRequest, DeployResponse, DeployService, HealthReport};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
