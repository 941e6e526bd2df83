#![allow(clippy::unwrap_used)]
// Integration tests for `AdminClient` using wiremock.

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use biodash_api::{AdminClient, AnalyticsRange, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AdminClient) {
    let server = MockServer::start().await;
    let client = AdminClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn biosite_json(id: Uuid, title: &str, slug: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "ownerId": Uuid::new_v4(),
        "title": title,
        "slug": slug,
        "active": true,
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-16T08:00:00Z",
        "ownerHandle": "someone"
    })
}

// ── Listing tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_biosites_paginated() {
    let (server, client) = setup().await;

    let envelope = json!({
        "data": [biosite_json(Uuid::new_v4(), "My Site", Some("my-site"))],
        "total": 47,
        "page": 2,
        "size": 10,
        "totalPages": 5
    });

    Mock::given(method("GET"))
        .and(path("/biosites"))
        .and(query_param("page", "2"))
        .and(query_param("size", "10"))
        .and(query_param("search", "my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let page = client
        .list_biosites(2, 10, &[("search", "my".into())])
        .await
        .unwrap();

    assert_eq!(page.total, 47);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].title, "My Site");
    assert_eq!(page.data[0].slug.as_deref(), Some("my-site"));
}

#[tokio::test]
async fn test_list_branch_biosites_bare_array() {
    let (server, client) = setup().await;

    let body = json!([
        biosite_json(Uuid::new_v4(), "Branch A", None),
        biosite_json(Uuid::new_v4(), "Branch B", Some("b")),
    ]);

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let sites = client.list_branch_biosites().await.unwrap();

    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].title, "Branch A");
    assert!(sites[0].slug.is_none());
}

// ── Row resource tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_list_links() {
    let (server, client) = setup().await;
    let biosite_id = Uuid::new_v4();

    let body = json!([{
        "id": Uuid::new_v4(),
        "biositeId": biosite_id,
        "title": "Instagram",
        "url": "https://instagram.com/someone",
        "platform": "instagram",
        "position": 0,
        "active": true
    }]);

    Mock::given(method("GET"))
        .and(path(format!("/links/biosite/{biosite_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let links = client.list_links(&biosite_id).await.unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].platform.as_deref(), Some("instagram"));
    assert_eq!(links[0].position, Some(0));
}

#[tokio::test]
async fn test_get_analytics_with_range_param() {
    let (server, client) = setup().await;
    let owner_id = Uuid::new_v4();

    let body = json!({
        "views": 120,
        "clicks": 34,
        "dailyActivity": [
            { "day": "2024-06-15T00:00:00Z", "views": 60, "clicks": 20 },
            { "day": "2024-06-16T00:00:00Z", "views": 60, "clicks": 14 }
        ],
        "clickDetails": [
            { "label": "instagram", "clicks": 30 }
        ]
    });

    Mock::given(method("GET"))
        .and(path(format!("/biosites/analytics/{owner_id}")))
        .and(query_param("range", "last30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let snap = client
        .get_analytics(&owner_id, AnalyticsRange::Last30)
        .await
        .unwrap();

    assert_eq!(snap.views, 120);
    assert_eq!(snap.clicks, 34);
    assert_eq!(snap.daily_activity.len(), 2);
    assert_eq!(snap.click_details[0].label, "instagram");
}

#[tokio::test]
async fn test_create_business_card() {
    let (server, client) = setup().await;
    let owner_id = Uuid::new_v4();

    let body = json!({
        "id": Uuid::new_v4(),
        "ownerId": owner_id,
        "fullName": "Jordan Example",
        "jobTitle": "Designer",
        "email": "jordan@example.com",
        "phone": null,
        "qrUrl": "https://cdn.example.com/qr/abc.png"
    });

    Mock::given(method("POST"))
        .and(path(format!("/business-cards/{owner_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let card = client.create_business_card(&owner_id).await.unwrap();

    assert_eq!(card.owner_id, owner_id);
    assert_eq!(card.full_name.as_deref(), Some("Jordan Example"));
    assert!(card.qr_url.is_some());
}

// ── Mutation tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_biosite() {
    let (server, client) = setup().await;
    let biosite_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path(format!("/biosites/{biosite_id}")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.delete_biosite(&biosite_id).await.unwrap();
}

#[tokio::test]
async fn test_set_biosite_active() {
    let (server, client) = setup().await;
    let biosite_id = Uuid::new_v4();

    let mut updated = biosite_json(biosite_id, "My Site", Some("my-site"));
    updated["active"] = json!(false);

    Mock::given(method("PATCH"))
        .and(path(format!("/biosites/{biosite_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
        .mount(&server)
        .await;

    let record = client.set_biosite_active(&biosite_id, false).await.unwrap();
    assert!(!record.active);
}

// ── Error mapping tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let result = client.list_branch_biosites().await;

    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

#[tokio::test]
async fn test_structured_api_error() {
    let (server, client) = setup().await;
    let biosite_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path(format!("/biosites/{biosite_id}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "biosite not found",
            "code": "biosites.not-found"
        })))
        .mount(&server)
        .await;

    let err = client.delete_biosite(&biosite_id).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.api_error_code(), Some("biosites.not-found"));
    match err {
        Error::Api { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "biosite not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_deserialization() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_branch_biosites().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_multibyte_malformed_body_maps_to_deserialization() {
    let (server, client) = setup().await;

    // The 200th byte lands inside '€'; the error preview must not split it.
    let body = format!("{}€", "a".repeat(199));
    Mock::given(method("GET"))
        .and(path("/biosites/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let result = client.list_branch_biosites().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
