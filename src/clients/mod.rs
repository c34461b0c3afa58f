//! Clients for the services a deployment touches: git for checkouts, Consul
//! for the configuration store and Nomad for job dispatch.
//!
//! The orchestrator only sees the traits below, so tests can substitute any
//! of them.

pub mod consul;
pub mod git;
mod http;
pub mod nomad;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use consul::{ConsulClient, KvEntry};
pub use git::{CloneError, GitCloner};
pub use nomad::{DispatchRequest, NomadClient};

/// Errors from the HTTP collaborators
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Setup(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

/// Materializes a repository into a local directory
#[async_trait]
pub trait RepositoryCloner: Send + Sync {
    async fn clone_repository(&self, slug: &str) -> Result<PathBuf, CloneError>;
}

/// Path-keyed configuration store
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError>;

    /// All entries under `prefix`, values still base64-encoded
    async fn list(&self, prefix: &str) -> Result<Vec<KvEntry>, ClientError>;
}

/// Cluster scheduler that instantiates parameterized job templates
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Dispatch `template` once, returning the dispatched job's ID
    async fn dispatch(&self, template: &str, request: &DispatchRequest)
        -> Result<String, ClientError>;
}
