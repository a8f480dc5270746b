//! Abstract transport for shipping reports to the ingestion endpoint.
//!
//! The plugin only needs a "send one call" capability. [`Transport`] is that
//! seam; [`HttpTransport`] is the default reqwest-backed implementation,
//! gated behind the `http-client` feature so hosts can plug in their own
//! client stack instead.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP method of a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl fmt::Display for CallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallMethod::Get => f.write_str("GET"),
            CallMethod::Post => f.write_str("POST"),
        }
    }
}

/// Description of one outbound call: method, path relative to the ingress
/// URL, and JSON body.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// HTTP method to use.
    pub method: CallMethod,
    /// Path appended to the ingress URL.
    pub path: String,
    /// JSON body of the call.
    pub body: Value,
}

/// Error type for transport construction.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured ingress URL could not be parsed.
    #[error("invalid ingress URL `{url}`: {reason}")]
    InvalidUrl {
        /// The URL as configured.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Error type for reading a failure's response body.
#[derive(Debug, thiserror::Error)]
pub enum TextBodyError {
    /// This failure carries no readable body.
    #[error("failure carries no response body")]
    Unavailable,

    /// The body was already consumed by an earlier read.
    #[error("response body already consumed")]
    Consumed,

    /// Reading the body failed.
    #[error("failed to read response body: {0}")]
    Read(String),
}

/// Failure surfaced by a transport call.
///
/// Transport SDKs disagree on what their errors look like; some carry a
/// readable response body, some do not. The text-body capability is optional:
/// implementations without one keep the defaults.
#[async_trait]
pub trait CallFailure: std::error::Error + Send + Sync {
    /// Whether this failure carries a readable response body.
    fn has_text_body(&self) -> bool {
        false
    }

    /// Read the response body text, if [`has_text_body`](Self::has_text_body)
    /// said one is available.
    async fn text_body(&self) -> Result<String, TextBodyError> {
        Err(TextBodyError::Unavailable)
    }
}

/// The send capability the plugin dispatches through.
///
/// Constructed once from the ingress URL at plugin construction time and
/// shared read-only by all requests, so implementations must be `Send + Sync`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one call. Resolves on success (2xx for HTTP transports) and
    /// fails with a [`CallFailure`] otherwise.
    async fn call(&self, options: CallOptions) -> Result<(), Box<dyn CallFailure>>;
}

/// Default HTTP transport backed by reqwest.
#[cfg(feature = "http-client")]
pub struct HttpTransport {
    base: reqwest::Url,
    client: reqwest::Client,
}

#[cfg(feature = "http-client")]
impl HttpTransport {
    /// Build a transport for the given ingress URL.
    ///
    /// Fails on a malformed URL or if the client cannot be constructed; the
    /// caller (the mode resolver) turns that into degraded mode.
    pub fn new(ingress_url: &str) -> Result<Self, TransportError> {
        let base = reqwest::Url::parse(ingress_url).map_err(|error| TransportError::InvalidUrl {
            url: ingress_url.to_string(),
            reason: error.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl {
                url: ingress_url.to_string(),
                reason: "URL cannot serve as a base".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| TransportError::Client(error.to_string()))?;
        Ok(Self { base, client })
    }

    /// Resolve a call path against the ingress base URL, preserving any base
    /// path segment the collector is mounted under.
    fn call_url(&self, path: &str) -> reqwest::Url {
        let mut url = self.base.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

#[cfg(feature = "http-client")]
#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, options: CallOptions) -> Result<(), Box<dyn CallFailure>> {
        let url = self.call_url(&options.path);
        let request = match options.method {
            CallMethod::Get => self.client.get(url),
            CallMethod::Post => self.client.post(url).json(&options.body),
        };

        let response = request
            .send()
            .await
            .map_err(|error| Box::new(HttpCallFailure::Network(error)) as Box<dyn CallFailure>)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Box::new(HttpCallFailure::Status {
                status,
                response: std::sync::Mutex::new(Some(response)),
            }))
        }
    }
}

/// Failure produced by [`HttpTransport`].
///
/// Status failures stash the response so its body can still be read by the
/// caller's failure handler; network failures have no body to offer.
#[cfg(feature = "http-client")]
#[derive(Debug)]
pub enum HttpCallFailure {
    /// The request never produced a response.
    Network(reqwest::Error),
    /// The ingestion endpoint answered with a non-success status.
    Status {
        /// The response status code.
        status: http::StatusCode,
        /// The response, consumed on the first body read.
        response: std::sync::Mutex<Option<reqwest::Response>>,
    },
}

#[cfg(feature = "http-client")]
impl fmt::Display for HttpCallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpCallFailure::Network(error) => write!(f, "request failed: {error}"),
            HttpCallFailure::Status { status, .. } => {
                write!(f, "ingestion endpoint returned {status}")
            }
        }
    }
}

#[cfg(feature = "http-client")]
impl std::error::Error for HttpCallFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpCallFailure::Network(error) => Some(error),
            HttpCallFailure::Status { .. } => None,
        }
    }
}

#[cfg(feature = "http-client")]
#[async_trait]
impl CallFailure for HttpCallFailure {
    fn has_text_body(&self) -> bool {
        matches!(self, HttpCallFailure::Status { .. })
    }

    async fn text_body(&self) -> Result<String, TextBodyError> {
        match self {
            HttpCallFailure::Network(_) => Err(TextBodyError::Unavailable),
            HttpCallFailure::Status { response, .. } => {
                let taken = response
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .take();
                match taken {
                    Some(response) => response
                        .text()
                        .await
                        .map_err(|error| TextBodyError::Read(error.to_string())),
                    None => Err(TextBodyError::Consumed),
                }
            }
        }
    }
}
