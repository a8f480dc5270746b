//! # ogd-telemetry
//!
//! OGD telemetry plugin for GraphQL servers.
//!
//! The plugin hooks the pre-execution extension point of the host pipeline,
//! builds a report describing the incoming operation (query hash, source,
//! operation descriptor, variables, extensions, originating HTTP context),
//! and posts it to the OGD ingestion endpoint on a detached task. It never
//! overrides the response and never lets a telemetry failure reach the
//! request path.
//!
//! ## Operating modes
//!
//! One dispatch strategy is bound at construction and never changes:
//!
//! - **NoOp** - `disable: true`, or the token is the literal `"DISABLED"`
//!   (any casing). Nothing is sent, nothing is logged.
//! - **Degraded** - the configuration is incomplete or the transport could
//!   not be constructed. Intended calls are logged, never sent. Construction
//!   itself never fails: a broken telemetry plugin must not stop the host.
//! - **Live** - reports are posted to `/sdk/graphql` under the configured
//!   ingress URL.
//!
//! ## Features
//!
//! - `http-client` (default) - reqwest-backed [`HttpTransport`]. Disable it
//!   and use [`OgdPlugin::with_transport_factory`] to bring your own
//!   [`Transport`].
//!
//! ## Example
//!
//! ```ignore
//! use ogd_telemetry::{OgdConfig, OgdPlugin};
//!
//! let plugin = OgdPlugin::new(OgdConfig::new("https://collector.example/", "abc123"));
//! server.register(plugin);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Configuration surface
pub mod config;

// Mode resolution and the bound dispatch strategy
pub mod dispatch;

// Defensive payload field encoding
pub mod encode;

// Outbound wire shape
pub mod payload;

// Interception hook and host lifecycle contract
pub mod plugin;

// Transport capability and default HTTP client
pub mod transport;

// Re-exports for convenience
pub use config::{ConfigError, OgdConfig, DISABLE_KEYWORD};
pub use dispatch::{resolve, Dispatch, DispatchMode};
pub use encode::{encode_field, EMPTY_SENTINEL, FAILED_SENTINEL};
pub use payload::{GraphqlReport, OriginHeaders, ReportPayload};
pub use plugin::{
    HttpContext, OgdPlugin, OperationContext, OperationDescriptor, OperationOutcome,
    RequestLifecycle, UNKNOWN_BODY,
};
pub use transport::{
    CallFailure, CallMethod, CallOptions, TextBodyError, Transport, TransportError,
};

#[cfg(feature = "http-client")]
pub use transport::{HttpCallFailure, HttpTransport};
