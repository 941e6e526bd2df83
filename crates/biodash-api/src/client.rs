// Hand-crafted async HTTP client for the biosite platform admin API.
//
// Base path: /
// Auth: X-API-KEY header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    AnalyticsResponse, BiositeRecord, BiositeUpdate, BusinessCardRecord, LinkRecord, PageEnvelope,
};

// ── Error response shape from the platform ───────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Time range ───────────────────────────────────────────────────────

/// Analytics aggregation window accepted by the analytics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyticsRange {
    Last7,
    Last30,
    LastYear,
}

impl AnalyticsRange {
    /// Wire value for the `range` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Last7 => "last7",
            Self::Last30 => "last30",
            Self::LastYear => "lastYear",
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the biosite platform admin API.
///
/// Uses API-key authentication and communicates via JSON REST endpoints.
/// Cheap to clone (`reqwest::Client` is reference-counted internally).
#[derive(Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `X-API-KEY` as a default header on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-API-KEY", key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse and normalize the base URL to always end with `/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"biosites"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                // Truncate on char boundaries; a byte slice could split a
                // multibyte character and panic.
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ── Biosite listings ─────────────────────────────────────────────

    /// List biosites page-at-a-time (full-access path).
    ///
    /// `filter_params` carries the server-representable filter parameters
    /// built by the caller's filter pipeline; `page`/`size` are appended
    /// here so pagination bookkeeping stays with the caller.
    pub async fn list_biosites(
        &self,
        page: u32,
        size: u32,
        filter_params: &[(&str, String)],
    ) -> Result<PageEnvelope<BiositeRecord>, Error> {
        let mut params: Vec<(&str, String)> =
            vec![("page", page.to_string()), ("size", size.to_string())];
        params.extend(filter_params.iter().map(|(k, v)| (*k, v.clone())));
        self.get_with_params("biosites", &params).await
    }

    /// List the caller's entire branch as a bare array (scoped path).
    pub async fn list_branch_biosites(&self) -> Result<Vec<BiositeRecord>, Error> {
        self.get("biosites/admin").await
    }

    // ── Row resources ────────────────────────────────────────────────

    /// Fetch all links belonging to a biosite.
    pub async fn list_links(&self, biosite_id: &Uuid) -> Result<Vec<LinkRecord>, Error> {
        self.get(&format!("links/biosite/{biosite_id}")).await
    }

    /// Fetch the analytics snapshot for an owner over a time range.
    pub async fn get_analytics(
        &self,
        owner_id: &Uuid,
        range: AnalyticsRange,
    ) -> Result<AnalyticsResponse, Error> {
        self.get_with_params(
            &format!("biosites/analytics/{owner_id}"),
            &[("range", range.as_param().to_owned())],
        )
        .await
    }

    /// Fetch (creating on first call) the business card for an owner.
    ///
    /// The platform exposes this as an idempotent POST: an existing card
    /// is returned as-is, otherwise one is generated with its QR reference.
    pub async fn create_business_card(
        &self,
        owner_id: &Uuid,
    ) -> Result<BusinessCardRecord, Error> {
        self.post(&format!("business-cards/{owner_id}"), &serde_json::json!({}))
            .await
    }

    // ── Admin mutations ──────────────────────────────────────────────

    /// Delete a biosite.
    pub async fn delete_biosite(&self, biosite_id: &Uuid) -> Result<(), Error> {
        self.delete(&format!("biosites/{biosite_id}")).await
    }

    /// Toggle a biosite's active flag. Returns the updated record.
    pub async fn set_biosite_active(
        &self,
        biosite_id: &Uuid,
        active: bool,
    ) -> Result<BiositeRecord, Error> {
        self.patch(&format!("biosites/{biosite_id}"), &BiositeUpdate { active })
            .await
    }
}
