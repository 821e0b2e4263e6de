//! HTTP(S) entropy source speaking the ANU-QRNG-compatible JSON format.
//!
//! `GET <url>?length=N&type=uint8` with a bearer token, answered by
//! `{"type":"uint8","length":N,"data":[...],"success":true}`.

use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION};
use http::{Request, Uri};
use http_body_util::{BodyExt, Empty};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;

use crate::config::{API_URL_KEY, REQUEST_TIMEOUT};
use crate::error::{PoolError, PoolResult, SourceError};
use crate::source::EntropySource;

/// Longest error body echoed back in [`SourceError::Status`].
const MAX_ERROR_BODY: usize = 256;

#[derive(Deserialize)]
struct RandomResponse {
    #[serde(default)]
    data: Vec<u8>,
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Blocking client for a remote entropy service.
///
/// Owns a private single-threaded tokio runtime and drives each request to
/// completion on the calling thread, which must not itself be inside an
/// async runtime. The pool only ever calls it from its refill thread.
/// Dropping it is safe anywhere, including inside an async context.
pub struct HttpEntropySource {
    endpoint: Uri,
    token: String,
    label: String,
    timeout: Duration,
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    // Always `Some` until drop.
    runtime: Option<tokio::runtime::Runtime>,
}

impl HttpEntropySource {
    pub fn new(url: &str, token: &str) -> PoolResult<Self> {
        Self::with_timeout(url, token, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: &str, token: &str, timeout: Duration) -> PoolResult<Self> {
        let endpoint: Uri = url.trim().parse().map_err(|e| PoolError::InvalidSetting {
            key: API_URL_KEY,
            reason: format!("{e}"),
        })?;
        let scheme = match endpoint.scheme_str() {
            Some(s @ ("http" | "https")) => s.to_string(),
            Some(other) => {
                return Err(PoolError::InvalidSetting {
                    key: API_URL_KEY,
                    reason: format!("unsupported scheme {other:?}, expected http or https"),
                });
            }
            None => {
                return Err(PoolError::InvalidSetting {
                    key: API_URL_KEY,
                    reason: "missing scheme".to_string(),
                });
            }
        };
        let label = match endpoint.authority() {
            Some(authority) => format!("{scheme}:{authority}"),
            None => {
                return Err(PoolError::InvalidSetting {
                    key: API_URL_KEY,
                    reason: "missing host".to_string(),
                });
            }
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PoolError::Runtime(format!("failed to build HTTP runtime: {e}")))?;
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .map_err(|e| PoolError::Runtime(format!("failed to build TLS config: {e}")))?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            endpoint,
            token: token.to_string(),
            label,
            timeout,
            client,
            runtime: Some(runtime),
        })
    }

    /// Endpoint with the request's query parameters appended.
    fn request_uri(&self, count: usize) -> Result<Uri, SourceError> {
        let base = self.endpoint.to_string();
        let sep = if self.endpoint.query().is_some() { '&' } else { '?' };
        format!("{base}{sep}length={count}&type=uint8")
            .parse()
            .map_err(|e| SourceError::Transport(format!("bad request uri: {e}")))
    }
}

impl EntropySource for HttpEntropySource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self, count: usize) -> Result<Vec<u8>, SourceError> {
        let req = Request::get(self.request_uri(count)?)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let exchange = async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| SourceError::Transport(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| SourceError::Transport(e.to_string()))?
                .to_bytes();
            Ok::<_, SourceError>((status, body))
        };

        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| SourceError::Transport("client is shutting down".to_string()))?;
        let (status, body) = runtime
            .block_on(async { tokio::time::timeout(self.timeout, exchange).await })
            .map_err(|_| SourceError::Timeout)??;

        if !status.is_success() {
            let text: String = String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(SourceError::Status {
                code: status.as_u16(),
                body: text,
            });
        }

        let parsed: RandomResponse =
            serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        if !parsed.success {
            return Err(SourceError::Rejected(
                parsed.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        if parsed.data.len() != count {
            log::debug!(
                "{} returned {} bytes for a request of {count}",
                self.label,
                parsed.data.len()
            );
        }
        Ok(parsed.data)
    }
}

impl Drop for HttpEntropySource {
    fn drop(&mut self) {
        // A plain runtime drop blocks, which panics inside an async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https() {
        let src = HttpEntropySource::new("https://rng.example/api/v1/entropy", "t").unwrap();
        assert_eq!(src.name(), "https:rng.example");
        assert_eq!(
            src.request_uri(16).unwrap().to_string(),
            "https://rng.example/api/v1/entropy?length=16&type=uint8"
        );
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let err = HttpEntropySource::new("ftp://rng.example/api", "t")
            .err()
            .unwrap();
        assert!(matches!(err, PoolError::InvalidSetting { key: API_URL_KEY, .. }));
    }

    #[test]
    fn test_rejects_missing_scheme() {
        assert!(HttpEntropySource::new("/api/v1/random", "t").is_err());
    }

    #[test]
    fn test_rejects_garbage_url() {
        assert!(HttpEntropySource::new("http://exa mple", "t").is_err());
    }

    #[test]
    fn test_request_uri_appends_query() {
        let src = HttpEntropySource::new("http://127.0.0.1:8042/api/v1/random", "t").unwrap();
        assert_eq!(src.name(), "http:127.0.0.1:8042");
        assert_eq!(
            src.request_uri(32).unwrap().to_string(),
            "http://127.0.0.1:8042/api/v1/random?length=32&type=uint8"
        );
    }

    #[test]
    fn test_request_uri_extends_existing_query() {
        let src = HttpEntropySource::new("http://rng.local/random?source=qrng", "t").unwrap();
        assert_eq!(
            src.request_uri(8).unwrap().to_string(),
            "http://rng.local/random?source=qrng&length=8&type=uint8"
        );
    }

    #[test]
    fn test_response_defaults() {
        let parsed: RandomResponse = serde_json::from_str(r#"{"data":[1,2,3]}"#).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data, vec![1, 2, 3]);
        assert!(parsed.error.is_none());
    }
}
