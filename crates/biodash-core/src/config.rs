// ── Session configuration ──

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::model::TimeRange;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::scope::AccessScope;

/// TLS verification mode (core-level mirror of the api crate's TlsMode).
#[derive(Debug, Clone)]
pub enum TlsVerification {
    SystemDefaults,
    CustomCa(PathBuf),
    DangerAcceptInvalid,
}

/// Everything an [`AdminTableSession`](crate::AdminTableSession) needs
/// to start: endpoint, credentials, and the caller's access scope.
///
/// The scope is resolved once, here, and passed by value into the
/// session — components never consult ambient session identity.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Platform base URL.
    pub url: Url,
    /// Admin API key.
    pub api_key: SecretString,
    /// Authorization tier, fixed for the session's lifetime.
    pub scope: AccessScope,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Initial rows per page.
    pub page_size: u32,
    /// Initial analytics aggregation window.
    pub time_range: TimeRange,
}

impl SessionConfig {
    pub fn new(url: Url, api_key: SecretString, scope: AccessScope) -> Self {
        Self {
            url,
            api_key,
            scope,
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            time_range: TimeRange::default(),
        }
    }

    pub(crate) fn transport(&self) -> biodash_api::TransportConfig {
        biodash_api::TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => biodash_api::TlsMode::System,
                TlsVerification::CustomCa(path) => biodash_api::TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => biodash_api::TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
