//! Retrying JSON HTTP client.
//!
//! Adapter between `reqwest` and the backoff executor: transport failures
//! and response statuses are mapped into `RequestError` so classification
//! and retry policy live entirely in `mentora-resilience`. Every request
//! runs under the policy's per-attempt timeout.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use mentora_resilience::{RequestError, Retrier, RetryError, RetryPolicy};

/// JSON API client with retry and per-attempt timeouts.
///
/// Only safe-to-repeat requests belong here: the retrier will re-issue
/// anything that fails transiently.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    retrier: Retrier,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
            retrier: Retrier::new(policy),
        })
    }

    /// GET `path` and deserialize the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RetryError> {
        let url = self.url(path);
        self.retrier
            .run_with_timeout(|| {
                let request = self.http.get(url.as_str());
                async move { dispatch::<T>(request).await }
            })
            .await
    }

    /// POST `body` as JSON to `path` and deserialize the JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RetryError> {
        let url = self.url(path);
        self.retrier
            .run_with_timeout(|| {
                let request = self.http.post(url.as_str()).json(body);
                async move { dispatch::<T>(request).await }
            })
            .await
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

async fn dispatch<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, RequestError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(RequestError::http(status.as_u16(), message));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RequestError::invalid(format!("malformed response body: {e}")))
}

fn map_transport_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::Timeout;
    }
    // reqwest's top-level Display hides the socket-level cause; flatten the
    // source chain so transient signatures stay matchable.
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    RequestError::transport(message)
}
