//! Shared configuration for the biosite admin dashboard CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `biodash_core::SessionConfig`. The access scope
//! is part of the profile: it is resolved here, once, and fixed for
//! the session built from it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use biodash_core::{AccessScope, SessionConfig, TimeRange, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no profile named '{0}' in the config file")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named platform profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    biodash_core::DEFAULT_PAGE_SIZE
}

/// A named platform profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Platform base URL (e.g., "https://api.biosites.example").
    pub url: String,

    /// Access scope: "full" (platform operator) or "scoped" (branch
    /// admin; requires `parent_id`).
    #[serde(default = "default_access")]
    pub access: String,

    /// Branch owner id for scoped access.
    pub parent_id: Option<Uuid>,

    /// API key (plaintext — prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (staging platforms only).
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override rows per page.
    pub page_size: Option<u32>,

    /// Initial analytics window: "last7", "last30", or "lastYear".
    pub time_range: Option<String>,
}

fn default_access() -> String {
    "full".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "biodash", "biodash").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("biodash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from an explicit file path (tests, `--config` flag).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BIODASH_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Pick a profile by explicit name or the configured default.
pub fn select_profile<'a>(
    config: &'a Config,
    name: Option<&str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let name = name
        .map(str::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into());
    config
        .profiles
        .get_key_value(name.as_str())
        .map(|(k, v)| (k.as_str(), v))
        .ok_or(ConfigError::UnknownProfile(name))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an API key from the credential chain: profile env var,
/// then system keyring, then plaintext in the config file.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring::Entry::new("biodash", &format!("{profile_name}/api-key")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store an API key in the system keyring for a profile.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("biodash", &format!("{profile_name}/api-key")).map_err(
        |e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        },
    )?;
    entry.set_password(key).map_err(|e| ConfigError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    })
}

// ── Scope resolution ────────────────────────────────────────────────

/// Resolve the profile's access scope. Scoped access requires a
/// `parent_id`; a bare `parent_id` implies scoped access.
pub fn resolve_scope(profile: &Profile) -> Result<AccessScope, ConfigError> {
    match (profile.access.as_str(), profile.parent_id) {
        ("full", None) => Ok(AccessScope::Full),
        ("full", Some(_)) => Err(ConfigError::Validation {
            field: "parent_id".into(),
            reason: "parent_id is only valid with access = \"scoped\"".into(),
        }),
        ("scoped", Some(parent_id)) => Ok(AccessScope::Scoped {
            parent_id: parent_id.into(),
        }),
        ("scoped", None) => Err(ConfigError::Validation {
            field: "parent_id".into(),
            reason: "access = \"scoped\" requires a parent_id".into(),
        }),
        (other, _) => Err(ConfigError::Validation {
            field: "access".into(),
            reason: format!("expected 'full' or 'scoped', got '{other}'"),
        }),
    }
}

// ── Session config ──────────────────────────────────────────────────

/// Build a `SessionConfig` from a profile and the global defaults.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let api_key = resolve_api_key(profile, profile_name)?;
    let scope = resolve_scope(profile)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let time_range = match profile.time_range {
        None => TimeRange::default(),
        Some(ref raw) => TimeRange::from_str(raw).map_err(|_| ConfigError::Validation {
            field: "time_range".into(),
            reason: format!("expected 'last7', 'last30', or 'lastYear', got '{raw}'"),
        })?,
    };

    let mut session = SessionConfig::new(url, api_key, scope);
    session.tls = tls;
    session.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    session.page_size = profile.page_size.unwrap_or(defaults.page_size);
    session.time_range = time_range;
    Ok(session)
}

// ── Tests ───────────────────────────────────────────────────────────
