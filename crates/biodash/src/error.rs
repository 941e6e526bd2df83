//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use biodash_config::ConfigError;
use biodash_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the platform: {message}")]
    #[diagnostic(
        code(biodash::fetch_failed),
        help(
            "Check the platform URL and your network connection.\n\
             Try: biodash sites list -v"
        )
    )]
    FetchFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(biodash::auth_failed),
        help(
            "Verify your API key.\n\
             Run: biodash config set-key --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(biodash::no_credentials),
        help(
            "Store one with: biodash config set-key --profile {profile}\n\
             Or set the BIODASH_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Biosite '{identifier}' not found")]
    #[diagnostic(
        code(biodash::not_found),
        help("Run: biodash sites list to see available biosites")
    )]
    NotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(biodash::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(biodash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(biodash::profile_not_found),
        help("Add a [profiles.{name}] section to your config file.")
    )]
    ProfileNotFound { name: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(biodash::no_config),
        help(
            "Create one at: {path}\n\
             Or pass --url and --api-key directly."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(biodash::config))]
    Config(String),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(biodash::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FetchFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PageFetch { message } => CliError::FetchFailed { message },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::BiositeNotFound { identifier } => CliError::NotFound { identifier },

            CoreError::Api { message, code, .. } => CliError::ApiError {
                code: code.unwrap_or_default(),
                message,
            },

            CoreError::Config { message } => CliError::Config(message),

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound { name },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other.to_string()),
        }
    }
}
