//! Integration tests for the public catalog surface.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p atelier-server)
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

fn base_url() -> String {
    std::env::var("ATELIER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_health_endpoints() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse readiness body");
    assert_eq!(body["ready"], true);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_categories_list() {
    let resp = Client::new()
        .get(format!("{}/categories", base_url()))
        .send()
        .await
        .expect("Failed to get categories");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse categories");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_search_with_price_filter() {
    let resp = Client::new()
        .get(format!(
            "{}/search_artworks?min=10&max=500&order=asc",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to search");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse search results");
    let results = body.as_array().expect("Expected an array");

    for artwork in results {
        let price: f64 = artwork["price"]
            .as_str()
            .expect("Price serialized as string")
            .parse()
            .expect("Price is numeric");
        assert!((10.0..=500.0).contains(&price));
    }
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_featured_and_newest_listings() {
    let client = Client::new();

    for listing in ["featured", "newest", "most_wishlisted"] {
        let resp = client
            .get(format!("{}/{listing}?n=5", base_url()))
            .send()
            .await
            .expect("Failed to get listing");
        assert_eq!(resp.status(), StatusCode::OK, "listing {listing}");

        let body: Value = resp.json().await.expect("Failed to parse listing");
        let results = body.as_array().expect("Expected an array");
        assert!(results.len() <= 5);
    }
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_unknown_artwork_is_404() {
    let resp = Client::new()
        .get(format!("{}/artwork?id=999999999", base_url()))
        .send()
        .await
        .expect("Failed to get artwork");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_graphql_categories_query() {
    let resp = Client::new()
        .post(format!("{}/graphql", base_url()))
        .json(&json!({ "query": "{ categories { id name } }" }))
        .send()
        .await
        .expect("Failed to post GraphQL query");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse GraphQL response");
    assert!(body["errors"].is_null(), "unexpected errors: {body}");
    assert!(body["data"]["categories"].is_array());
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_contact_form() {
    let resp = Client::new()
        .post(format!("{}/message_to_administrator", base_url()))
        .json(&json!({
            "name": "Interested Buyer",
            "email": "buyer@example.com",
            "message": "Is the landscape series still available?",
        }))
        .send()
        .await
        .expect("Failed to post contact message");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
}

#[tokio::test]
#[ignore = "Requires a running server and database"]
async fn test_contact_form_rejects_invalid_email() {
    let resp = Client::new()
        .post(format!("{}/message_to_administrator", base_url()))
        .json(&json!({
            "name": "Someone",
            "email": "not-an-email",
            "message": "Hello",
        }))
        .send()
        .await
        .expect("Failed to post contact message");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
