// ── Admin table session ──
//
// Composition root for the dashboard data layer: one session per
// signed-in admin, owning the pagination controller, the filter state,
// the scope router and the per-row resource caches. The session is the
// only type consumers drive; everything below it is deterministic given
// the session's calls.

use std::collections::HashMap;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use biodash_api::AdminClient;

use crate::cache::{CacheEntry, ResourceCaches};
use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::filter::{DebounceGate, FilterCriteria};
use crate::model::{AnalyticsSnapshot, Biosite, BiositeId, BusinessCard, Link, OwnerId, TimeRange};
use crate::pagination::PaginationController;
use crate::scope::{AccessScope, ScopeRouter};

// ── Load state ───────────────────────────────────────────────────────

/// Lifecycle of the authoritative page fetch, published on a watch
/// channel so view layers can re-render on transitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No fetch has been started yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The page fetch failed; recovery is a manual retry.
    Error(String),
}

// ── Table view snapshot ──────────────────────────────────────────────

/// Render-ready snapshot of the table. Cheap to build: rows are shared
/// `Arc`s into the session's buffer.
#[derive(Debug, Clone)]
pub struct TableView {
    pub rows: Vec<std::sync::Arc<Biosite>>,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub can_go_next: bool,
    pub can_go_prev: bool,
    /// Page numbers for the pager, with [`ELLIPSIS`](crate::ELLIPSIS)
    /// sentinels where runs are collapsed.
    pub visible_pages: Vec<i64>,
    pub page_info: String,
}

// ── Session ──────────────────────────────────────────────────────────

/// One admin's live view over the biosite table.
///
/// The access scope is fixed at construction and threaded through the
/// router; nothing here re-derives authorization mid-session. Row
/// resources (cards, links, analytics) load lazily on expansion and are
/// cached for the session's lifetime, keyed so that neither collapse
/// nor time-range switches ever invalidate what was already fetched.
pub struct AdminTableSession {
    client: AdminClient,
    router: ScopeRouter,
    pagination: PaginationController,
    filters: FilterCriteria,
    caches: ResourceCaches,
    /// Staged (not yet applied) live-search text.
    pending_search: String,
    search_gate: DebounceGate,
    /// Rows with their detail panel open, each with the token guarding
    /// its in-flight resource fetches.
    expanded: HashMap<BiositeId, CancellationToken>,
    /// Rows with their analytics panel open.
    analytics_open: HashMap<BiositeId, (OwnerId, CancellationToken)>,
    time_range: TimeRange,
    state_tx: watch::Sender<LoadState>,
    /// Parent of every per-fetch token; cancelled on drop.
    shutdown: CancellationToken,
}

impl AdminTableSession {
    /// Build a session from resolved configuration. No network traffic
    /// happens here; call [`start`](Self::start) to load the first page.
    pub fn new(config: &SessionConfig) -> Result<Self, CoreError> {
        let client =
            AdminClient::from_api_key(config.url.as_str(), &config.api_key, &config.transport())?;
        let (state_tx, _) = watch::channel(LoadState::Idle);

        info!(scope = ?config.scope, "admin table session created");
        Ok(Self {
            router: ScopeRouter::new(client.clone(), config.scope),
            client,
            pagination: PaginationController::new(config.page_size),
            filters: FilterCriteria::default(),
            caches: ResourceCaches::default(),
            pending_search: String::new(),
            search_gate: DebounceGate::default(),
            expanded: HashMap::new(),
            analytics_open: HashMap::new(),
            time_range: config.time_range,
            state_tx,
            shutdown: CancellationToken::new(),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the first page (scoped access: the whole branch).
    pub async fn start(&mut self) -> Result<(), CoreError> {
        self.reload(true).await
    }

    /// Force a re-fetch of the authoritative data, bypassing the scoped
    /// branch cache.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        self.reload(true).await
    }

    /// Re-run the last failed fetch. Identical to [`refresh`](Self::refresh);
    /// the separate name exists so call sites read as intent.
    pub async fn retry(&mut self) -> Result<(), CoreError> {
        self.reload(true).await
    }

    async fn reload(&mut self, force: bool) -> Result<(), CoreError> {
        self.state_tx.send_replace(LoadState::Loading);
        let result = self
            .router
            .load(
                self.pagination.current_page().max(1),
                self.pagination.page_size(),
                &self.filters,
                force,
            )
            .await;
        match result {
            Ok(source) => {
                self.pagination.apply(source);
                self.state_tx.send_replace(LoadState::Ready);
                Ok(())
            }
            Err(err) => {
                self.state_tx.send_replace(LoadState::Error(err.to_string()));
                Err(err)
            }
        }
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Jump to page `n`. Out-of-range targets are silently ignored.
    /// Only full-access sessions hit the network here; scoped sessions
    /// re-slice the branch they already hold.
    pub async fn set_page(&mut self, n: u32) -> Result<bool, CoreError> {
        if !self.pagination.set_page(n) {
            return Ok(false);
        }
        if self.router.page_change_hits_network() {
            self.reload(false).await?;
        }
        Ok(true)
    }

    /// Change rows-per-page; resets to page 1.
    pub async fn set_page_size(&mut self, n: u32) -> Result<bool, CoreError> {
        if !self.pagination.set_page_size(n) {
            return Ok(false);
        }
        if self.router.page_change_hits_network() {
            self.reload(false).await?;
        }
        Ok(true)
    }

    pub async fn next_page(&mut self) -> Result<bool, CoreError> {
        let target = self.pagination.current_page() + 1;
        self.set_page(target).await
    }

    pub async fn prev_page(&mut self) -> Result<bool, CoreError> {
        let current = self.pagination.current_page();
        if current <= 1 {
            return Ok(false);
        }
        self.set_page(current - 1).await
    }

    pub async fn go_to_first(&mut self) -> Result<bool, CoreError> {
        self.set_page(1).await
    }

    pub async fn go_to_last(&mut self) -> Result<bool, CoreError> {
        let last = self.pagination.total_pages();
        self.set_page(last).await
    }

    // ── Filters ──────────────────────────────────────────────────────

    /// Replace the filter form wholesale and reload from page 1.
    ///
    /// Full access re-queries the server with the new parameters; scoped
    /// access re-runs the local pipeline over the cached branch, with no
    /// network traffic.
    pub async fn set_filters(&mut self, filters: FilterCriteria) -> Result<(), CoreError> {
        if filters == self.filters {
            return Ok(());
        }
        self.filters = filters;
        self.pagination.go_to_first();
        self.reload(false).await
    }

    /// Reset every filter field to its default and reload.
    pub async fn reset_filters(&mut self) -> Result<(), CoreError> {
        self.pending_search.clear();
        self.set_filters(FilterCriteria::default()).await
    }

    /// Stage a live-search keystroke and arm a new debounce generation.
    ///
    /// The caller waits [`SEARCH_DEBOUNCE`](crate::SEARCH_DEBOUNCE) and
    /// then calls [`commit_search`](Self::commit_search) with the
    /// returned generation; staged text from superseded generations is
    /// never applied.
    pub fn stage_search(&mut self, text: impl Into<String>) -> u64 {
        self.pending_search = text.into();
        self.search_gate.arm()
    }

    /// Apply the staged search if `generation` is still the latest.
    /// Returns `Ok(false)` when a newer keystroke superseded it.
    pub async fn commit_search(&mut self, generation: u64) -> Result<bool, CoreError> {
        if !self.search_gate.is_current(generation) {
            debug!(generation, "search generation superseded; dropping");
            return Ok(false);
        }
        let mut filters = self.filters.clone();
        filters.search = self.pending_search.clone();
        self.set_filters(filters).await?;
        Ok(true)
    }

    // ── Row expansion ────────────────────────────────────────────────

    /// Open or close a row's detail panel. Returns the new visibility.
    ///
    /// First expansion kicks off the row's business-card and link
    /// fetches concurrently; both are cached, so re-expanding a row
    /// later is network-silent. The fetches are awaited to completion
    /// before this returns, so a collapse issued through the session
    /// finds them already settled; the per-row token covers fetches
    /// abandoned mid-await, when the call future or the whole session
    /// is dropped. Cancellation leaves those keys absent for the next
    /// expansion.
    pub async fn toggle_expansion(&mut self, biosite_id: BiositeId) -> bool {
        if let Some(token) = self.expanded.remove(&biosite_id) {
            token.cancel();
            return false;
        }
        let Some(owner_id) = self.pagination.find(biosite_id).map(|s| s.owner_id) else {
            debug!(%biosite_id, "expansion requested for a row not in the buffer");
            return false;
        };

        let token = self.shutdown.child_token();
        self.expanded.insert(biosite_id, token.clone());

        let card_client = self.client.clone();
        let link_client = self.client.clone();
        tokio::join!(
            self.caches.cards.fetch_if_absent(owner_id, &token, || async move {
                card_client
                    .create_business_card(&owner_id.0)
                    .await
                    .map(BusinessCard::from)
            }),
            self.caches.links.fetch_if_absent(biosite_id, &token, || async move {
                link_client
                    .list_links(&biosite_id.0)
                    .await
                    .map(|links| links.into_iter().map(Link::from).collect::<Vec<_>>())
            }),
        );
        true
    }

    /// Open or close a row's analytics panel. Returns the new visibility.
    ///
    /// Like [`toggle_expansion`](Self::toggle_expansion), the fetch is
    /// awaited here; the token guards abandoned fetches, not a
    /// same-task collapse.
    pub async fn toggle_analytics(&mut self, biosite_id: BiositeId) -> bool {
        if let Some((_, token)) = self.analytics_open.remove(&biosite_id) {
            token.cancel();
            return false;
        }
        let Some(owner_id) = self.pagination.find(biosite_id).map(|s| s.owner_id) else {
            debug!(%biosite_id, "analytics requested for a row not in the buffer");
            return false;
        };

        let token = self.shutdown.child_token();
        self.analytics_open
            .insert(biosite_id, (owner_id, token.clone()));
        self.fetch_analytics(biosite_id, owner_id, self.time_range, &token)
            .await;
        true
    }

    /// Switch the analytics aggregation window.
    ///
    /// Snapshots are keyed by `(biosite, range)`, so nothing is
    /// invalidated: open panels fetch under the new key if needed, and
    /// switching back to a previously viewed range is served entirely
    /// from cache.
    pub async fn set_time_range(&mut self, range: TimeRange) {
        if range == self.time_range {
            return;
        }
        self.time_range = range;

        let open: Vec<_> = self
            .analytics_open
            .iter()
            .map(|(id, (owner, token))| (*id, *owner, token.clone()))
            .collect();
        for (biosite_id, owner_id, token) in open {
            self.fetch_analytics(biosite_id, owner_id, range, &token)
                .await;
        }
    }

    async fn fetch_analytics(
        &self,
        biosite_id: BiositeId,
        owner_id: OwnerId,
        range: TimeRange,
        cancel: &CancellationToken,
    ) {
        let client = self.client.clone();
        self.caches
            .analytics
            .fetch_if_absent((biosite_id, range), cancel, || async move {
                client
                    .get_analytics(&owner_id.0, range.into())
                    .await
                    .map(AnalyticsSnapshot::from)
            })
            .await;
    }

    // ── Admin mutations ──────────────────────────────────────────────

    /// Delete a biosite, drop its cached resources, and re-fetch the
    /// authoritative page.
    pub async fn delete_biosite(&mut self, biosite_id: BiositeId) -> Result<(), CoreError> {
        let owner_id = self.pagination.find(biosite_id).map(|s| s.owner_id);
        self.client.delete_biosite(&biosite_id.0).await?;
        info!(%biosite_id, "biosite deleted");

        self.close_row(biosite_id);
        if let Some(owner_id) = owner_id {
            self.caches.evict_row(biosite_id, owner_id);
        } else {
            self.caches.links.evict(&biosite_id);
            self.caches.analytics.evict_where(|(id, _)| *id == biosite_id);
        }
        self.reload(true).await
    }

    /// Activate or deactivate a biosite, then re-fetch so the row
    /// reflects the server's view.
    pub async fn set_biosite_active(
        &mut self,
        biosite_id: BiositeId,
        active: bool,
    ) -> Result<(), CoreError> {
        let owner_id = self.pagination.find(biosite_id).map(|s| s.owner_id);
        self.client.set_biosite_active(&biosite_id.0, active).await?;
        info!(%biosite_id, active, "biosite active flag updated");

        if let Some(owner_id) = owner_id {
            self.caches.evict_row(biosite_id, owner_id);
        }
        self.reload(true).await
    }

    fn close_row(&mut self, biosite_id: BiositeId) {
        if let Some(token) = self.expanded.remove(&biosite_id) {
            token.cancel();
        }
        if let Some((_, token)) = self.analytics_open.remove(&biosite_id) {
            token.cancel();
        }
    }

    // ── Read side ────────────────────────────────────────────────────

    /// Snapshot the table for rendering.
    ///
    /// Full-access rows get a secondary local pass so filter changes
    /// staged between server round trips still narrow the visible page;
    /// scoped rows were already filtered when the branch was windowed.
    pub fn view(&self) -> TableView {
        let rows = if self.router.scope().is_full() {
            self.filters.apply(self.pagination.page_rows())
        } else {
            self.pagination.page_rows().to_vec()
        };
        let state = self.state_tx.borrow().clone();
        TableView {
            rows,
            current_page: self.pagination.current_page(),
            total_pages: self.pagination.total_pages(),
            page_size: self.pagination.page_size(),
            total_items: self.pagination.total_items(),
            loading: state == LoadState::Loading,
            error: match state {
                LoadState::Error(msg) => Some(msg),
                _ => None,
            },
            can_go_next: self.pagination.can_go_next(),
            can_go_prev: self.pagination.can_go_prev(),
            visible_pages: self.pagination.visible_pages(),
            page_info: self.pagination.page_info(),
        }
    }

    /// Watch the page-fetch lifecycle.
    pub fn load_state(&self) -> watch::Receiver<LoadState> {
        self.state_tx.subscribe()
    }

    pub fn scope(&self) -> AccessScope {
        self.router.scope()
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn is_expanded(&self, biosite_id: BiositeId) -> bool {
        self.expanded.contains_key(&biosite_id)
    }

    pub fn analytics_shown(&self, biosite_id: BiositeId) -> bool {
        self.analytics_open.contains_key(&biosite_id)
    }

    /// Cached business card state for an owner, if ever fetched.
    pub fn business_card(&self, owner_id: OwnerId) -> Option<CacheEntry<BusinessCard>> {
        self.caches.cards.get(&owner_id)
    }

    /// Cached link list state for a row, if ever fetched.
    pub fn links(&self, biosite_id: BiositeId) -> Option<CacheEntry<Vec<Link>>> {
        self.caches.links.get(&biosite_id)
    }

    /// Cached analytics state for a row under the current time range.
    pub fn analytics(&self, biosite_id: BiositeId) -> Option<CacheEntry<AnalyticsSnapshot>> {
        self.caches.analytics.get(&(biosite_id, self.time_range))
    }
}

impl Drop for AdminTableSession {
    fn drop(&mut self) {
        // Abort every outstanding row-resource fetch.
        self.shutdown.cancel();
    }
}
