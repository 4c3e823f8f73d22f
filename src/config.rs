//! Client configuration.
//!
//! [`ClientConfig`] holds everything a [`crate::Client`] needs to know about
//! the service: where it lives, which API key to send, and an optional
//! transport timeout. Build it in code through [`ClientConfig::builder()`] or
//! read it from the environment with [`ClientConfig::from_env()`].

use crate::error::PdfTablesError;
use std::fmt;

/// Canonical service URL, used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://pdftables.com/api";

/// Environment variable overriding the endpoint.
pub const ENDPOINT_ENV: &str = "PDFTABLES_ENDPOINT";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "PDFTABLES_API_KEY";

/// Configuration for a [`crate::Client`].
///
/// # Example
/// ```rust
/// use pdftables_api::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_key("my-key")
///     .endpoint("http://localhost:8080/api")
///     .timeout_secs(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint(), "http://localhost:8080/api");
/// ```
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Service URL. If None, uses [`DEFAULT_ENDPOINT`].
    ///
    /// The string is parsed lazily, when a request URL is built, so a bad
    /// value surfaces as [`PdfTablesError::InvalidEndpoint`] on the first call.
    pub endpoint: Option<String>,

    /// API key sent as the `key` query parameter.
    pub api_key: String,

    /// Whole-request timeout in seconds for transports built by
    /// [`crate::Client::new`]. Default: None (no timeout).
    ///
    /// Large PDFs can take minutes to convert, so there is no default cap.
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read `PDFTABLES_ENDPOINT` and `PDFTABLES_API_KEY`.
    ///
    /// Unset and empty variables are treated the same way.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v: &String| !v.is_empty());
        Self {
            endpoint: non_empty(ENDPOINT_ENV),
            api_key: non_empty(API_KEY_ENV).unwrap_or_default(),
            timeout_secs: None,
        }
    }

    /// The endpoint in effect: the configured one or [`DEFAULT_ENDPOINT`].
    pub fn endpoint(&self) -> &str {
        match self.endpoint.as_deref() {
            Some(e) if !e.is_empty() => e,
            _ => DEFAULT_ENDPOINT,
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, PdfTablesError> {
        if self.config.timeout_secs == Some(0) {
            return Err(PdfTablesError::InvalidConfig(
                "Timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Hide all but the last four characters of a secret.
pub(crate) fn redact(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "****".into();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{tail}")
}
