#![allow(clippy::unwrap_used)]
// End-to-end tests for `AdminTableSession` against a wiremock server.
//
// Request-count expectations (`.expect(n)`) are verified when the mock
// server drops, so every test doubles as a network-traffic assertion.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use biodash_core::{
    AccessScope, AdminTableSession, CacheEntry, FilterCriteria, LoadState, SessionConfig,
    SortOrder, StatusFilter, TimeRange,
};

// ── Fixtures ─────────────────────────────────────────────────────────

fn biosite_json(id: Uuid, owner_id: Uuid, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "ownerId": owner_id,
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "active": true,
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-16T08:00:00Z",
        "ownerHandle": null
    })
}

fn branch_json(count: usize) -> serde_json::Value {
    let sites: Vec<_> = (0..count)
        .map(|i| biosite_json(Uuid::new_v4(), Uuid::new_v4(), &format!("Site {i:02}")))
        .collect();
    json!(sites)
}

fn analytics_json(views: u64) -> serde_json::Value {
    json!({
        "views": views,
        "clicks": views / 3,
        "dailyActivity": [],
        "clickDetails": []
    })
}

fn session(server: &MockServer, scope: AccessScope) -> AdminTableSession {
    let config = SessionConfig::new(
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("test-key"),
        scope,
    );
    AdminTableSession::new(&config).unwrap()
}

fn scoped_session(server: &MockServer) -> AdminTableSession {
    session(
        server,
        AccessScope::Scoped {
            parent_id: Uuid::new_v4().into(),
        },
    )
}

// ── Scope routing ────────────────────────────────────────────────────

#[tokio::test]
async fn full_scope_fetches_each_page_from_server() {
    let server = MockServer::start().await;

    let page = |n: u32| {
        json!({
            "data": [biosite_json(Uuid::new_v4(), Uuid::new_v4(), &format!("Page {n}"))],
            "total": 47,
            "page": n,
            "size": 10,
            "totalPages": 5
        })
    };

    Mock::given(method("GET"))
        .and(path("/biosites"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/biosites"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(2)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server, AccessScope::Full);
    session.start().await.unwrap();

    let view = session.view();
    assert_eq!(view.current_page, 1);
    assert_eq!(view.total_pages, 5);
    assert_eq!(view.rows[0].title, "Page 1");

    assert!(session.set_page(2).await.unwrap());
    assert_eq!(session.view().rows[0].title, "Page 2");
}

#[tokio::test]
async fn scoped_navigation_never_touches_the_network() {
    let server = MockServer::start().await;

    // One request, total, no matter how much navigation follows.
    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(branch_json(25)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();

    let view = session.view();
    assert_eq!(view.total_items, 25);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.rows.len(), 10);

    assert!(session.set_page(2).await.unwrap());
    assert!(session.next_page().await.unwrap());
    assert_eq!(session.view().current_page, 3);
    assert_eq!(session.view().rows.len(), 5);

    assert!(session.set_page_size(5).await.unwrap());
    assert_eq!(session.view().current_page, 1);
    assert_eq!(session.view().total_pages, 5);
}

#[tokio::test]
async fn scoped_filters_run_locally() {
    let server = MockServer::start().await;

    let a = biosite_json(Uuid::new_v4(), Uuid::new_v4(), "Active One");
    let mut b = biosite_json(Uuid::new_v4(), Uuid::new_v4(), "Sleepy Two");
    b["active"] = json!(false);

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([a, b])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();
    assert_eq!(session.view().total_items, 2);

    session
        .set_filters(FilterCriteria {
            status: StatusFilter::Inactive,
            sort_order: SortOrder::Asc,
            ..FilterCriteria::default()
        })
        .await
        .unwrap();

    let view = session.view();
    assert_eq!(view.total_items, 1);
    assert_eq!(view.rows[0].title, "Sleepy Two");

    session.reset_filters().await.unwrap();
    assert_eq!(session.view().total_items, 2);
}

#[tokio::test]
async fn refresh_refetches_the_scoped_branch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(branch_json(3)))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();
    session.refresh().await.unwrap();
}

// ── Search debounce ──────────────────────────────────────────────────

#[tokio::test]
async fn superseded_search_generation_is_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            biosite_json(Uuid::new_v4(), Uuid::new_v4(), "Coffee"),
            biosite_json(Uuid::new_v4(), Uuid::new_v4(), "Bakery"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();

    let first = session.stage_search("cof");
    let second = session.stage_search("coffee");

    // The slower keystroke lost the race; nothing applies.
    assert!(!session.commit_search(first).await.unwrap());
    assert_eq!(session.filters().search, "");

    assert!(session.commit_search(second).await.unwrap());
    assert_eq!(session.filters().search, "coffee");
    assert_eq!(session.view().rows.len(), 1);
    assert_eq!(session.view().rows[0].title, "Coffee");
}

// ── Row expansion and caching ────────────────────────────────────────

#[tokio::test]
async fn re_expansion_is_served_from_cache() {
    let server = MockServer::start().await;
    let biosite_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            biosite_json(biosite_id, owner_id, "Only Site")
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/business-cards/{owner_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": Uuid::new_v4(),
            "ownerId": owner_id,
            "fullName": "Jordan Example",
            "qrUrl": "https://cdn.example.com/qr/abc.png"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/links/biosite/{biosite_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "biositeId": biosite_id,
            "title": "Instagram",
            "url": "https://instagram.com/someone",
            "active": true
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();
    let id = session.view().rows[0].id;
    let owner = session.view().rows[0].owner_id;

    assert!(session.toggle_expansion(id).await);
    let card = session.business_card(owner).unwrap();
    assert_eq!(
        card.value().and_then(|c| c.full_name.as_deref()),
        Some("Jordan Example")
    );
    let links = session.links(id).unwrap();
    assert_eq!(links.value().map(Vec::len), Some(1));

    // Collapse and re-expand: resources must come from cache (the mock
    // expectations above allow exactly one call each).
    assert!(!session.toggle_expansion(id).await);
    assert!(session.toggle_expansion(id).await);
    assert!(session.links(id).unwrap().value().is_some());
}

#[tokio::test]
async fn failed_row_resource_degrades_to_resolved_empty() {
    let server = MockServer::start().await;
    let biosite_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            biosite_json(biosite_id, owner_id, "Only Site")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/business-cards/{owner_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": Uuid::new_v4(),
            "ownerId": owner_id
        })))
        .mount(&server)
        .await;
    // Link fetch fails; the row must still expand with the card shown.
    Mock::given(method("GET"))
        .and(path(format!("/links/biosite/{biosite_id}")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();
    let id = session.view().rows[0].id;
    let owner = session.view().rows[0].owner_id;

    assert!(session.toggle_expansion(id).await);

    assert!(session.business_card(owner).unwrap().value().is_some());
    assert_eq!(session.links(id), Some(CacheEntry::Resolved(None)));

    // Resolved-empty suppresses re-fetch on re-expansion too.
    session.toggle_expansion(id).await;
    session.toggle_expansion(id).await;
    assert_eq!(session.links(id), Some(CacheEntry::Resolved(None)));
}

// ── Analytics time ranges ────────────────────────────────────────────

#[tokio::test]
async fn range_switch_fetches_new_key_and_reuses_old_one() {
    let server = MockServer::start().await;
    let biosite_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            biosite_json(biosite_id, owner_id, "Only Site")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/biosites/analytics/{owner_id}")))
        .and(query_param("range", "last7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analytics_json(70)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/biosites/analytics/{owner_id}")))
        .and(query_param("range", "last30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analytics_json(300)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();
    let id = session.view().rows[0].id;

    assert!(session.toggle_analytics(id).await);
    assert_eq!(
        session.analytics(id).unwrap().value().map(|a| a.views),
        Some(70)
    );

    // New range, new key: exactly one extra fetch.
    session.set_time_range(TimeRange::Last30).await;
    assert_eq!(
        session.analytics(id).unwrap().value().map(|a| a.views),
        Some(300)
    );

    // Switching back is served from cache (expect(1) above verifies).
    session.set_time_range(TimeRange::Last7).await;
    assert_eq!(
        session.analytics(id).unwrap().value().map(|a| a.views),
        Some(70)
    );
}

// ── Error handling ───────────────────────────────────────────────────

#[tokio::test]
async fn failed_page_fetch_surfaces_error_and_retry_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(branch_json(2)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);

    assert!(session.start().await.is_err());
    let view = session.view();
    assert!(view.error.is_some());
    assert!(view.rows.is_empty());
    assert!(matches!(*session.load_state().borrow(), LoadState::Error(_)));

    session.retry().await.unwrap();
    assert_eq!(session.view().total_items, 2);
    assert_eq!(*session.load_state().borrow(), LoadState::Ready);
}

// ── Admin mutations ──────────────────────────────────────────────────

#[tokio::test]
async fn delete_evicts_row_resources_and_reloads() {
    let server = MockServer::start().await;
    let biosite_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            biosite_json(biosite_id, owner_id, "Doomed Site")
        ])))
        .expect(2) // initial load + forced reload after delete
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/links/biosite/{biosite_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/business-cards/{owner_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": Uuid::new_v4(),
            "ownerId": owner_id
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/biosites/{biosite_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = scoped_session(&server);
    session.start().await.unwrap();
    let id = session.view().rows[0].id;
    let owner = session.view().rows[0].owner_id;

    session.toggle_expansion(id).await;
    assert!(session.links(id).is_some());

    session.delete_biosite(id).await.unwrap();

    assert!(session.links(id).is_none());
    assert!(session.business_card(owner).is_none());
    assert!(!session.is_expanded(id));
}
