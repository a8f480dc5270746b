//! The per-request interception hook and the host lifecycle contract.
//!
//! The plugin observes the pre-execution extension point: the last moment a
//! plugin may substitute a response for the operation. It never substitutes
//! one — it builds a report, fires it at the ingestion endpoint on a detached
//! task, and immediately signals pass-through so execution proceeds
//! untouched whatever the telemetry side does.

use crate::config::OgdConfig;
use crate::dispatch::{self, Dispatch, DispatchMode};
use crate::encode::encode_field;
use crate::payload::{GraphqlReport, OriginHeaders, ReportPayload};
use crate::transport::{CallFailure, CallMethod, CallOptions, Transport, TransportError};
use async_trait::async_trait;
use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Placeholder body text for failures without a text-body capability.
pub const UNKNOWN_BODY: &str = "UNKNOWN";

/// Ingestion endpoint sub-path all reports are posted to.
const REPORT_PATH: &str = "/sdk/graphql";

/// Outcome of the pre-execution extension point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationOutcome {
    /// Do not override; proceed with normal execution.
    #[default]
    PassThrough,
    /// Substitute this response instead of executing the operation.
    Override(Value),
}

/// Originating HTTP request details, captured for the report.
#[derive(Debug, Clone)]
pub struct HttpContext {
    /// Request method.
    pub method: Method,
    /// Scheme the request arrived on (`http` or `https`).
    pub scheme: String,
    /// Request headers; only `Host` is read today.
    pub headers: HeaderMap,
    /// Path (and query, if any) as originally received.
    pub original_path: String,
}

impl HttpContext {
    /// Capture the relevant pieces of an in-flight request.
    pub fn new(
        method: Method,
        scheme: impl Into<String>,
        headers: HeaderMap,
        original_path: impl Into<String>,
    ) -> Self {
        Self {
            method,
            scheme: scheme.into(),
            headers,
            original_path: original_path.into(),
        }
    }

    /// Reconstruct the URL the client requested: scheme + host header +
    /// original path.
    pub fn original_url(&self) -> String {
        let host = self
            .headers
            .get(http::header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        format!("{}://{}{}", self.scheme, host, self.original_path)
    }
}

/// The parsed operation, as the host pipeline describes it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    /// AST node kind (e.g. `OperationDefinition`).
    pub kind: String,
    /// Operation type: `query`, `mutation`, or `subscription`.
    pub operation: String,
    /// Operation name.
    pub name: String,
    /// The parsed operation document as JSON, host-provided.
    pub document: Value,
}

/// Context bundle handed to the pre-execution extension point.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// The in-flight HTTP request the operation arrived on.
    pub http: HttpContext,
    /// Content hash of the query.
    pub query_hash: String,
    /// Raw query source text.
    pub source: String,
    /// The parsed operation.
    pub operation: OperationDescriptor,
    /// Request variables.
    pub variables: Value,
    /// Request extensions.
    pub extensions: Value,
}

/// Request lifecycle surface exposed by the host pipeline.
///
/// Every hook defaults to doing nothing so a plugin implements only the
/// extension points it cares about. Hooks run inside the host's tokio
/// runtime, once per request except [`server_will_start`](Self::server_will_start).
#[async_trait]
pub trait RequestLifecycle: Send + Sync {
    /// The server is about to start accepting requests.
    async fn server_will_start(&self) {}

    /// The query source has been resolved.
    async fn did_resolve_source(&self, _ctx: &OperationContext) {}

    /// Parsing is about to begin.
    async fn parsing_did_start(&self, _ctx: &OperationContext) {}

    /// Validation is about to begin.
    async fn validation_did_start(&self, _ctx: &OperationContext) {}

    /// Fired immediately before execution. A non-pass-through outcome is used
    /// as the response instead of executing the operation.
    async fn response_for_operation(&self, _ctx: &OperationContext) -> OperationOutcome {
        OperationOutcome::PassThrough
    }

    /// Execution is about to begin.
    async fn execution_did_start(&self, _ctx: &OperationContext) {}

    /// The response is about to be sent.
    async fn will_send_response(&self, _ctx: &OperationContext) {}
}

/// The OGD telemetry plugin.
///
/// Construct once, register with the host pipeline, and forget about it:
/// construction is infallible (misconfiguration degrades to log-only mode)
/// and no failure inside the plugin can reach the request path.
///
/// # Example
///
/// ```ignore
/// use ogd_telemetry::{OgdConfig, OgdPlugin};
///
/// let plugin = OgdPlugin::new(OgdConfig::new("https://collector.example/", "abc123"));
/// server.register(plugin);
/// ```
pub struct OgdPlugin {
    dispatch: Arc<Dispatch>,
}

impl OgdPlugin {
    /// Build the plugin with the default HTTP transport.
    #[cfg(feature = "http-client")]
    pub fn new(config: OgdConfig) -> Self {
        Self::with_transport_factory(config, |url| {
            crate::transport::HttpTransport::new(url)
                .map(|transport| Arc::new(transport) as Arc<dyn Transport>)
        })
    }

    /// Build the plugin with a caller-supplied transport constructor.
    ///
    /// The factory runs at most once, and only for an enabled, complete
    /// configuration. Its failure binds degraded mode instead of propagating.
    pub fn with_transport_factory<F>(config: OgdConfig, make_transport: F) -> Self
    where
        F: FnOnce(&str) -> Result<Arc<dyn Transport>, TransportError>,
    {
        Self {
            dispatch: Arc::new(dispatch::resolve(&config, make_transport)),
        }
    }

    /// Which dispatch strategy got bound at construction.
    pub fn mode(&self) -> DispatchMode {
        self.dispatch.mode()
    }

    fn build_report(ctx: &OperationContext) -> ReportPayload {
        ReportPayload {
            graphql: GraphqlReport {
                query_hash: ctx.query_hash.clone(),
                query_source: ctx.source.clone(),
                operation_kind: ctx.operation.kind.clone(),
                operation_type: ctx.operation.operation.clone(),
                operation_name: ctx.operation.name.clone(),
                operation_serialized: encode_field("operation", &ctx.operation),
                variables_serialized: encode_field("variables", &ctx.variables),
                extensions_serialized: encode_field("extensions", &ctx.extensions),
            },
            headers: OriginHeaders {
                original_method: ctx.http.method.to_string(),
                original_url: ctx.http.original_url(),
            },
        }
    }
}

#[async_trait]
impl RequestLifecycle for OgdPlugin {
    async fn response_for_operation(&self, ctx: &OperationContext) -> OperationOutcome {
        let report = Self::build_report(ctx);
        let body = match serde_json::to_value(&report) {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, "failed to serialize OGD report; dropping it");
                return OperationOutcome::PassThrough;
            }
        };

        // Fire and forget: the request must never wait on telemetry.
        let dispatch = Arc::clone(&self.dispatch);
        tokio::spawn(async move {
            let call = CallOptions {
                method: CallMethod::Post,
                path: REPORT_PATH.to_string(),
                body,
            };
            if let Err(failure) = dispatch.send(call).await {
                report_upload_failure(failure).await;
            }
        });

        OperationOutcome::PassThrough
    }
}

/// Log a dispatch failure, reading its response body when one is offered.
async fn report_upload_failure(failure: Box<dyn CallFailure>) {
    if failure.has_text_body() {
        match failure.text_body().await {
            Ok(text) => {
                tracing::error!(body = %text, error = %failure, "failed to upload OGD stats")
            }
            Err(error) => {
                tracing::error!(%error, "unknown response type from the ingestion endpoint")
            }
        }
    } else {
        tracing::error!(body = UNKNOWN_BODY, error = %failure, "failed to upload OGD stats");
    }
}
