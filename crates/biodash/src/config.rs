//! Glue between `biodash-config` profiles and CLI flag overrides.
//!
//! Core never sees these types -- it receives a pre-built `SessionConfig`.

use std::time::Duration;

use secrecy::SecretString;

use biodash_config as cfg;
use biodash_core::{AccessScope, SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &cfg::Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `SessionConfig` from the config file, profile, and CLI
/// overrides. Flags beat profile values; the profile beats defaults.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let config = cfg::load_config_or_default();
    let profile_name = active_profile_name(global, &config);

    if let Some(profile) = config.profiles.get(&profile_name) {
        let mut session = resolve_with_flag_credentials(profile, &profile_name, &config, global)?;
        apply_flag_overrides(&mut session, global)?;
        return Ok(session);
    }

    // No profile found -- build from CLI flags / env vars alone.
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: cfg::config_path().display().to_string(),
    })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let api_key = global
        .api_key
        .as_ref()
        .map(|k| SecretString::from(k.clone()))
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let scope = match global.parent_id {
        Some(parent_id) => AccessScope::Scoped {
            parent_id: parent_id.into(),
        },
        None => AccessScope::Full,
    };

    let mut session = SessionConfig::new(url, api_key, scope);
    apply_flag_overrides(&mut session, global)?;
    Ok(session)
}

/// Resolve a profile, letting the `--api-key` flag short-circuit the
/// configured credential chain.
fn resolve_with_flag_credentials(
    profile: &cfg::Profile,
    profile_name: &str,
    config: &cfg::Config,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    if let Some(ref key) = global.api_key {
        let url: url::Url = profile.url.parse().map_err(|_| CliError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {}", profile.url),
        })?;
        let scope = cfg::resolve_scope(profile)?;
        let mut session = SessionConfig::new(url, SecretString::from(key.clone()), scope);
        session.timeout =
            Duration::from_secs(profile.timeout.unwrap_or(config.defaults.timeout));
        session.page_size = profile.page_size.unwrap_or(config.defaults.page_size);
        return Ok(session);
    }
    Ok(cfg::profile_to_session_config(
        profile,
        profile_name,
        &config.defaults,
    )?)
}

fn apply_flag_overrides(
    session: &mut SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref url_str) = global.url {
        session.url = url_str.parse().map_err(|_| CliError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
    }
    if let Some(parent_id) = global.parent_id {
        session.scope = AccessScope::Scoped {
            parent_id: parent_id.into(),
        };
    }
    if global.insecure {
        session.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    Ok(())
}
