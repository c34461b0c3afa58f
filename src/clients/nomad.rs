//! Nomad job dispatch client

use super::http::{build_client, check_status, join_url, transport_error};
use super::{ClientError, Scheduler};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "nomad";
const TOKEN_HEADER: &str = "x-nomad-token";

/// Body of `POST /v1/job/:job_id/dispatch`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DispatchRequest {
    pub meta: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct DispatchResponse {
    #[serde(rename = "DispatchedJobID")]
    dispatched_job_id: String,
    #[serde(rename = "EvalID", default)]
    eval_id: Option<String>,
}

pub struct NomadClient {
    base_url: String,
    http_client: Client,
}

impl NomadClient {
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

    pub fn dispatch_url(&self, template: &str) -> String {
        join_url(&self.base_url, &format!("v1/job/{}/dispatch", template))
    }
}

#[async_trait]
impl Scheduler for NomadClient {
    async fn dispatch(
        &self,
        template: &str,
        request: &DispatchRequest,
    ) -> Result<String, ClientError> {
        let url = self.dispatch_url(template);
        debug!(%url, meta = ?request.meta, "Dispatching job");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let response = check_status(SERVICE, response).await?;

        let body: DispatchResponse = response.json().await.map_err(|e| {
            ClientError::InvalidResponse {
                service: SERVICE,
                message: e.to_string(),
            }
        })?;

        debug!(
            job_id = %body.dispatched_job_id,
            eval_id = body.eval_id.as_deref().unwrap_or(""),
            "Job dispatched"
        );
        Ok(body.dispatched_job_id)
    }
}
