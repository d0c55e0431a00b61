use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::TransportError;

/// Request/response boundary used by every guarded channel action.
///
/// Implementations own timeouts, retries and rate limiting. Responses are
/// the decoded JSON body, or `Value::Null` for an empty body.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError>;
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError>;
    async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError>;
}

impl<T: Transport> Transport for Arc<T> {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        (**self).get(path, query).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError> {
        (**self).post(path, body).await
    }

    async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError> {
        (**self).patch(path, body).await
    }
}

/// Upper bound on configured attempts per request.
pub const MAX_ATTEMPTS_CAP: u32 = 10;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// REST transport over `reqwest` with exponential backoff.
///
/// GET and PATCH retry on 5xx and request errors. POST is not idempotent,
/// so it only retries when the connection could not be established. Other
/// non-success statuses fail immediately.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
    token: Option<String>,
    max_attempts: u32,
    retry_base_delay: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(config.api.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            token: config.api.token.clone(),
            max_attempts: config.http.max_attempts.clamp(1, MAX_ATTEMPTS_CAP),
            retry_base_delay: Duration::from_millis(config.http.retry_base_delay_ms),
        })
    }

    async fn send_with_retry(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let idempotent = method != Method::POST;
        let mut last_err = TransportError::Http("no attempts made".to_string());
        for attempt in 0..self.max_attempts {
            let mut request = self.http.request(method.clone(), &url);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("Bot {token}"));
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(resp) if resp.status().is_success() => return read_json(resp).await,
                Ok(resp) if idempotent && resp.status().is_server_error() => {
                    last_err = status_error(path, resp).await;
                }
                Ok(resp) => return Err(status_error(path, resp).await),
                Err(e) if idempotent || e.is_connect() => {
                    last_err = TransportError::from(e);
                }
                Err(e) => return Err(TransportError::from(e)),
            }
            if attempt + 1 < self.max_attempts {
                let delay = self
                    .retry_base_delay
                    .saturating_mul(2u32.saturating_pow(attempt))
                    .min(MAX_RETRY_DELAY);
                tracing::warn!(
                    %method,
                    path,
                    attempt = attempt + 1,
                    error = %last_err,
                    "request failed, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
        Err(last_err)
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        self.send_with_retry(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError> {
        self.send_with_retry(Method::POST, path, &[], body.as_ref())
            .await
    }

    async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError> {
        self.send_with_retry(Method::PATCH, path, &[], body.as_ref())
            .await
    }
}

async fn read_json(resp: Response) -> Result<Value, TransportError> {
    let bytes = resp.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
}

async fn status_error(path: &str, resp: Response) -> TransportError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    TransportError::Status {
        path: path.to_string(),
        status,
        body,
    }
}
