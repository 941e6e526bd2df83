// ── Core error types ──
//
// User-facing errors from biodash-core. These are NOT API-specific --
// consumers never see raw HTTP plumbing. The `From<biodash_api::Error>`
// impl translates transport-layer errors into domain-appropriate
// variants. Per-row resource failures never surface here at all: they
// degrade into "resolved-empty" cache entries (see `cache`).

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The authoritative page fetch failed. The only error surfaced to
    /// table consumers; recovery is a manual retry, never automatic.
    #[error("Page fetch failed: {message}")]
    PageFetch { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Biosite not found: {identifier}")]
    BiositeNotFound { identifier: String },

    /// API rejection outside the page-fetch path (admin mutations).
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
        code: Option<String>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap an API error as a page-fetch failure.
    pub(crate) fn page_fetch(err: &biodash_api::Error) -> Self {
        Self::PageFetch {
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<biodash_api::Error> for CoreError {
    fn from(err: biodash_api::Error) -> Self {
        match err {
            biodash_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            biodash_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            biodash_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::BiositeNotFound {
                identifier: message,
            },
            biodash_api::Error::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                status: Some(status),
                code,
            },
            biodash_api::Error::Transport(ref e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
                code: None,
            },
            biodash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            biodash_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            biodash_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
