//! Request-level operations: deploy a batch, list deployed apps, liveness.

use crate::clients::{ClientError, KvStore};
use crate::deploy::{BatchItem, BatchOrchestrator, DeploymentConfig, DispatchResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// KV prefix every deployment config lives under
pub const APPS_PREFIX: &str = "apps/";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("slugs must be an array")]
    SlugsNotArray,

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AppsError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to decode {key}: {message}")]
    Decode { key: String, message: String },
}

/// Validated `{"slugs": [...]}` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub items: Vec<BatchItem>,
}

impl DeployRequest {
    pub fn new(slugs: Vec<String>) -> Self {
        Self {
            items: slugs.into_iter().map(BatchItem::Slug).collect(),
        }
    }

    /// Accepts any JSON value; only an array under `slugs` passes.
    ///
    /// Non-string elements become [`BatchItem::Malformed`] so they still get
    /// an error result of their own and the output lines up with the input.
    pub fn from_value(body: &Value) -> Result<Self, RequestError> {
        let items = body
            .get("slugs")
            .and_then(Value::as_array)
            .ok_or(RequestError::SlugsNotArray)?;

        let items = items
            .iter()
            .map(|item| match item {
                Value::String(s) => BatchItem::Slug(s.clone()),
                other => BatchItem::Malformed(other.to_string()),
            })
            .collect();

        Ok(Self { items })
    }

    pub fn from_json(text: &str) -> Result<Self, RequestError> {
        let body: Value = serde_json::from_str(text)?;
        Self::from_value(&body)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResponse {
    pub results: Vec<DispatchResult>,
}

/// A stored config plus the name taken from its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedApp {
    pub name: String,
    #[serde(flatten)]
    pub config: DeploymentConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppsResponse {
    pub apps: Vec<DeployedApp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Liveness; touches nothing external
pub fn health_report() -> HealthReport {
    HealthReport {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    }
}

pub struct DeployService {
    orchestrator: BatchOrchestrator,
    kv: Arc<dyn KvStore>,
}

impl DeployService {
    pub fn new(orchestrator: BatchOrchestrator, kv: Arc<dyn KvStore>) -> Self {
        Self { orchestrator, kv }
    }

    /// Validate the body, then run the batch. Only a bad body fails the call.
    pub async fn deploy(&self, body: &Value) -> Result<DeployResponse, RequestError> {
        let request = DeployRequest::from_value(body)?;
        Ok(self.deploy_request(&request).await)
    }

    pub async fn deploy_request(&self, request: &DeployRequest) -> DeployResponse {
        DeployResponse {
            results: self.orchestrator.run_items(&request.items).await,
        }
    }

    pub async fn list_apps(&self) -> Result<AppsResponse, AppsError> {
        let entries = self.kv.list(APPS_PREFIX).await?;

        let mut apps = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(encoded) = entry.value.as_deref() else {
                debug!(key = %entry.key, "Skipping KV entry without a value");
                continue;
            };
            apps.push(decode_app(&entry.key, encoded)?);
        }

        info!(count = apps.len(), "Listed deployed apps");
        Ok(AppsResponse { apps })
    }
}

/// `apps/<name>/config` + base64 JSON value -> [`DeployedApp`]
fn decode_app(key: &str, encoded: &str) -> Result<DeployedApp, AppsError> {
    let decode_err = |message: String| AppsError::Decode {
        key: key.to_string(),
        message,
    };

    let raw = BASE64
        .decode(encoded)
        .map_err(|e| decode_err(e.to_string()))?;
    let config: DeploymentConfig =
        serde_json::from_slice(&raw).map_err(|e| decode_err(e.to_string()))?;

    let name = key.split('/').nth(1).unwrap_or_default().to_string();
    Ok(DeployedApp { name, config })
}
