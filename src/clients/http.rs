use super::ClientError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use std::time::Duration;

/// Client with a request timeout and an optional ACL token header
pub(super) fn build_client(
    timeout: Duration,
    token: Option<(&'static str, &str)>,
) -> Result<Client, ClientError> {
    let mut headers = HeaderMap::new();

    if let Some((name, value)) = token {
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| ClientError::Setup(format!("{} contains invalid characters", name)))?;
        value.set_sensitive(true);
        headers.insert(name, value);
    }

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| ClientError::Setup(e.to_string()))
}

pub(super) fn transport_error(url: &str, source: reqwest::Error) -> ClientError {
    ClientError::Transport {
        url: url.to_string(),
        source,
    }
}

/// Pass successful responses through, turn anything else into `ClientError::Status`
pub(super) async fn check_status(
    service: &'static str,
    response: Response,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        service,
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

pub(super) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
