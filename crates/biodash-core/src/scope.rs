// ── Access-scope routing ──
//
// Selects, once per session, which fetch strategy feeds the pagination
// controller. The scope is fixed at construction from the caller's
// role and threaded explicitly — leaf operations never re-read ambient
// session state. The two paths share no pagination or collection
// state, so neither can leak into the other's bookkeeping.

use std::sync::Arc;

use biodash_api::AdminClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::filter::FilterCriteria;
use crate::model::{Biosite, OwnerId};
use crate::pagination::PageSource;

/// Authorization tier of the session's caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessScope {
    /// Platform operator: sees all biosites, server-side pagination.
    Full,
    /// Branch admin: sees only the branch under `parent_id`, fetched
    /// whole once and paginated locally.
    Scoped { parent_id: OwnerId },
}

impl AccessScope {
    pub fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Routes page loads to the scope's data source.
pub struct ScopeRouter {
    client: AdminClient,
    scope: AccessScope,
    /// Scoped path only: the branch collection, fetched once per
    /// session and re-fetched only on explicit refresh.
    branch: Option<Vec<Arc<Biosite>>>,
}

impl ScopeRouter {
    pub fn new(client: AdminClient, scope: AccessScope) -> Self {
        Self {
            client,
            scope,
            branch: None,
        }
    }

    pub fn scope(&self) -> AccessScope {
        self.scope
    }

    /// Whether a page or page-size change needs a network round trip.
    pub fn page_change_hits_network(&self) -> bool {
        self.scope.is_full()
    }

    /// Load table data for the given page/size/filters.
    ///
    /// Full access issues one server-paginated request with the
    /// server-representable filters as query parameters. Scoped access
    /// fetches the whole branch at most once (`force` re-fetches) and
    /// runs the local filter/sort pipeline — no network traffic on
    /// subsequent page or filter changes.
    pub async fn load(
        &mut self,
        page: u32,
        size: u32,
        filters: &FilterCriteria,
        force: bool,
    ) -> Result<PageSource, CoreError> {
        match self.scope {
            AccessScope::Full => {
                let envelope = self
                    .client
                    .list_biosites(page, size, &filters.server_params())
                    .await
                    .map_err(|e| CoreError::page_fetch(&e))?;
                debug!(
                    total = envelope.total,
                    page = envelope.page,
                    "loaded server-paginated biosite page"
                );
                Ok(PageSource::Envelope {
                    data: envelope
                        .data
                        .into_iter()
                        .map(|r| Arc::new(Biosite::from(r)))
                        .collect(),
                    total: envelope.total,
                    page: envelope.page,
                    size: envelope.size,
                    total_pages: envelope.total_pages,
                })
            }
            AccessScope::Scoped { parent_id } => {
                if force || self.branch.is_none() {
                    let records = self
                        .client
                        .list_branch_biosites()
                        .await
                        .map_err(|e| CoreError::page_fetch(&e))?;
                    debug!(
                        parent = %parent_id,
                        count = records.len(),
                        "loaded scoped branch collection"
                    );
                    self.branch = Some(
                        records
                            .into_iter()
                            .map(|r| Arc::new(Biosite::from(r)))
                            .collect(),
                    );
                }
                let branch = self.branch.as_deref().unwrap_or(&[]);
                Ok(PageSource::Complete(filters.apply(branch)))
            }
        }
    }
}
