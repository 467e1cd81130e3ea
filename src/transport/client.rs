//! reqwest-backed transport and an origin-bound API client.

use std::time::Duration;

use crate::environment::BackendOrigin;
use crate::resilience::retries::{Retrier, RetryError};
use crate::resilience::timeouts::with_timeout;
use crate::transport::failure::TransportFailure;

const USER_AGENT: &str = concat!("api-connectivity/", env!("CARGO_PKG_VERSION"));

/// Successful (2xx) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Thin wrapper over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// GET `url`, bounding the whole exchange (connect, headers, body) by `timeout`.
    ///
    /// Non-2xx answers are returned as failures carrying the status code.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<ApiResponse, TransportFailure> {
        tracing::debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "GET");

        with_timeout(timeout, async {
            let response = self.http.get(url).send().await?;
            let status = response.status();

            if !status.is_success() {
                let body = read_error_body(response).await;
                return Err(TransportFailure::status(
                    status.as_u16(),
                    format!("{} returned {}: {}", url, status, snippet(&body)),
                ));
            }

            // The answer arrived even if its body did not.
            let body = response.text().await.map_err(|e| {
                let mut failure = TransportFailure::from(e);
                failure.status = Some(status.as_u16());
                failure
            })?;

            Ok::<_, TransportFailure>(ApiResponse {
                status: status.as_u16(),
                body,
            })
        })
        .await
    }
}

/// Bytes of an error body kept for the failure message.
const ERROR_BODY_LIMIT: usize = 1024;

/// Best-effort read of at most `ERROR_BODY_LIMIT` bytes; read errors end the body.
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut buf = Vec::new();
    while buf.len() < ERROR_BODY_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(ERROR_BODY_LIMIT - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Error body read failed");
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn snippet(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// API client bound to one backend origin.
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    origin: BackendOrigin,
}

impl ApiClient {
    pub fn new(transport: HttpTransport, origin: BackendOrigin) -> Self {
        Self { transport, origin }
    }

    pub fn origin(&self) -> &BackendOrigin {
        &self.origin
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Single attempt against `{origin}{path}`.
    pub async fn get(&self, path: &str, timeout: Duration) -> Result<ApiResponse, TransportFailure> {
        self.transport.get(&self.origin.join(path), timeout).await
    }

    /// GET guarded by `retrier`; each attempt gets a fresh `timeout` window.
    pub async fn get_with_retry(
        &self,
        path: &str,
        timeout: Duration,
        retrier: &Retrier,
    ) -> Result<ApiResponse, RetryError> {
        retrier.run(move || self.get(path, timeout)).await
    }
}
