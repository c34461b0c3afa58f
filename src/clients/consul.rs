//! Consul KV client

use super::http::{build_client, check_status, join_url, transport_error};
use super::{ClientError, KvStore};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "consul";
const TOKEN_HEADER: &str = "x-consul-token";

/// One key from a recursive KV listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KvEntry {
    pub key: String,
    /// Base64-encoded value; Consul reports folder keys with a null value
    #[serde(default)]
    pub value: Option<String>,
}

pub struct ConsulClient {
    base_url: String,
    http_client: Client,
}

impl ConsulClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: base_url.into(),
            http_client: build_client(timeout, token.map(|t| (TOKEN_HEADER, t)))?,
        })
    }

    pub fn key_url(&self, key: &str) -> String {
        join_url(&self.base_url, &format!("v1/kv/{}", key))
    }
}

#[async_trait]
impl KvStore for ConsulClient {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError> {
        let url = self.key_url(key);
        debug!(%url, bytes = value.len(), "Writing KV entry");

        let response = self
            .http_client
            .put(&url)
            .body(value.to_vec())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let response = check_status(SERVICE, response).await?;

        // Consul answers `true` or `false` depending on whether the write applied
        let applied = response
            .text()
            .await
            .map_err(|e| transport_error(&url, e))?;
        if applied.trim() != "true" {
            return Err(ClientError::InvalidResponse {
                service: SERVICE,
                message: format!("write to {} was not applied", key),
            });
        }

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KvEntry>, ClientError> {
        let url = self.key_url(prefix);
        debug!(%url, "Listing KV entries");

        let response = self
            .http_client
            .get(&url)
            .query(&[("recurse", "true")])
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = check_status(SERVICE, response).await?;
        response
            .json::<Vec<KvEntry>>()
            .await
            .map_err(|e| ClientError::InvalidResponse {
                service: SERVICE,
                message: e.to_string(),
            })
    }
}
