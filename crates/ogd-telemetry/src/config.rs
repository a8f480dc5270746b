//! Plugin configuration.
//!
//! The configuration is read once at plugin construction and never consulted
//! again; the chosen dispatch mode is fixed for the plugin's lifetime.

use serde::{Deserialize, Serialize};

/// Token value that forces no-op mode regardless of other settings.
///
/// Compared case-insensitively, so `"disabled"` and `"Disabled"` work too.
pub const DISABLE_KEYWORD: &str = "DISABLED";

/// Error type for configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No token was supplied and the plugin was not explicitly disabled.
    #[error("ogdToken must be provided unless the plugin is explicitly disabled")]
    MissingToken,

    /// No ingress URL was supplied and the plugin was not explicitly disabled.
    #[error("ogdIngressUrl must be provided unless the plugin is explicitly disabled")]
    MissingIngressUrl,
}

/// Configuration for the OGD telemetry plugin.
///
/// Deserializes from the same shape the hosted SDKs use:
///
/// ```json
/// { "ogdIngressUrl": "https://collector.example/", "ogdToken": "abc123" }
/// ```
///
/// # Example
///
/// ```ignore
/// use ogd_telemetry::OgdConfig;
///
/// let config = OgdConfig::new("https://collector.example/", "abc123");
/// let staging = OgdConfig::new("https://collector.example/", "abc123").disable(true);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OgdConfig {
    /// URL endpoint for the OGD data collection service.
    pub ogd_ingress_url: String,

    /// Unique token provided to you by OGD.
    pub ogd_token: String,

    /// Explicit kill switch, for per-environment toggles that keep the plugin
    /// registered in the pipeline.
    pub disable: bool,
}

impl OgdConfig {
    /// Create a configuration with the given ingress URL and token.
    pub fn new(ingress_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            ogd_ingress_url: ingress_url.into(),
            ogd_token: token.into(),
            disable: false,
        }
    }

    /// Set the explicit kill switch.
    pub fn disable(mut self, disable: bool) -> Self {
        self.disable = disable;
        self
    }

    /// Whether reporting is turned off, either via the `disable` flag or the
    /// disable keyword supplied as the token.
    pub fn is_disabled(&self) -> bool {
        self.disable || self.ogd_token.eq_ignore_ascii_case(DISABLE_KEYWORD)
    }

    /// Validate that an enabled configuration is complete.
    ///
    /// Only meaningful when [`is_disabled`](Self::is_disabled) is false; a
    /// disabled plugin never touches the network configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ogd_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.ogd_ingress_url.is_empty() {
            return Err(ConfigError::MissingIngressUrl);
        }
        Ok(())
    }
}
