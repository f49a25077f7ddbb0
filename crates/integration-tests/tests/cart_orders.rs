//! Integration tests for the shopping cart, wishlist, and checkout.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied and at least
//!   one artwork with stock (create one via the admin API or a seed script)
//! - The server running (cargo run -p atelier-server)
//!
//! Run with: cargo test -p atelier-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

fn base_url() -> String {
    std::env::var("ATELIER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Register a fresh account and return a logged-in client.
async fn logged_in_client() -> Client {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client");

    let email = format!("cart-test-{}@example.com", Uuid::new_v4());
    let resp = client
        .post(format!("{}/users/new_user", base_url()))
        .json(&json!({
            "first_name": "Cart",
            "last_name": "Tester",
            "email": email,
            "password": "cart test password",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/login", base_url()))
        .json(&json!({ "email": email, "password": "cart test password" }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    client
}

/// Find an artwork with stock available, via public search.
async fn artwork_in_stock(client: &Client) -> Option<(i32, i32)> {
    let resp = client
        .get(format!("{}/search_artworks?n=50", base_url()))
        .send()
        .await
        .expect("Failed to search artworks");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse search results");
    body.as_array()?.iter().find_map(|artwork| {
        let quantity = artwork["quantity"].as_i64()?;
        (quantity > 0).then(|| {
            #[allow(clippy::cast_possible_truncation)]
            let id = artwork["id"].as_i64().expect("Artwork has an id") as i32;
            #[allow(clippy::cast_possible_truncation)]
            let quantity = quantity as i32;
            (id, quantity)
        })
    })
}

#[tokio::test]
#[ignore = "Requires a running server, database, and seeded stock"]
async fn test_cart_requires_login() {
    let client = Client::new();
    let resp = client
        .get(format!("{}/users/shopping_cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "authentication required");
}

#[tokio::test]
#[ignore = "Requires a running server, database, and seeded stock"]
async fn test_cart_add_and_remove_restores_stock() {
    let client = logged_in_client().await;
    let Some((artwork_id, available)) = artwork_in_stock(&client).await else {
        panic!("No artwork with stock available; seed the catalog first");
    };

    // Adding reserves one unit immediately
    let resp = client
        .post(format!("{}/users/shopping_cart/add", base_url()))
        .json(&json!({ "artwork_id": artwork_id }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = resp.json().await.expect("Failed to parse cart");
    let line = cart
        .as_array()
        .and_then(|lines| {
            lines
                .iter()
                .find(|l| l["artwork_id"].as_i64() == Some(i64::from(artwork_id)))
        })
        .expect("Added artwork appears in the cart");
    assert_eq!(line["quantity"], 1);

    // Public listing reflects the reservation
    let resp = client
        .get(format!("{}/artwork?id={artwork_id}", base_url()))
        .send()
        .await
        .expect("Failed to get artwork");
    let body: Value = resp.json().await.expect("Failed to parse artwork");
    assert_eq!(body["quantity"], i64::from(available) - 1);

    // Removing releases the reservation
    let resp = client
        .post(format!("{}/users/shopping_cart/remove", base_url()))
        .json(&json!({ "artwork_id": artwork_id }))
        .send()
        .await
        .expect("Failed to remove from cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/artwork?id={artwork_id}", base_url()))
        .send()
        .await
        .expect("Failed to get artwork");
    let body: Value = resp.json().await.expect("Failed to parse artwork");
    assert_eq!(body["quantity"], i64::from(available));
}

#[tokio::test]
#[ignore = "Requires a running server, database, and seeded stock"]
async fn test_cart_cannot_exceed_stock() {
    let client = logged_in_client().await;
    let Some((artwork_id, available)) = artwork_in_stock(&client).await else {
        panic!("No artwork with stock available; seed the catalog first");
    };

    // Take everything that is available
    let resp = client
        .post(format!("{}/users/shopping_cart/add", base_url()))
        .json(&json!({ "artwork_id": artwork_id, "quantity": available }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    // One more is a conflict, not an oversell
    let resp = client
        .post(format!("{}/users/shopping_cart/increase", base_url()))
        .json(&json!({ "artwork_id": artwork_id }))
        .send()
        .await
        .expect("Failed to send increase");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Clean up the reservation
    client
        .post(format!("{}/users/shopping_cart/remove", base_url()))
        .json(&json!({ "artwork_id": artwork_id }))
        .send()
        .await
        .expect("Failed to remove from cart");
}

#[tokio::test]
#[ignore = "Requires a running server, database, and seeded stock"]
async fn test_checkout_empty_cart_conflicts() {
    let client = logged_in_client().await;

    let resp = client
        .post(format!("{}/users/order", base_url()))
        .json(&json!({
            "first_name": "Cart",
            "last_name": "Tester",
            "email": "invoice@example.com",
            "address": "1 Gallery Lane",
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires a running server, database, and seeded stock"]
async fn test_checkout_creates_order_and_empties_cart() {
    let client = logged_in_client().await;
    let Some((artwork_id, _)) = artwork_in_stock(&client).await else {
        panic!("No artwork with stock available; seed the catalog first");
    };

    client
        .post(format!("{}/users/shopping_cart/add", base_url()))
        .json(&json!({ "artwork_id": artwork_id }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{}/users/order", base_url()))
        .json(&json!({
            "first_name": "Cart",
            "last_name": "Tester",
            "email": "invoice@example.com",
            "address": "1 Gallery Lane",
            "phone": "555-0100",
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse order response");
    let order_id = body["order_id"].as_i64().expect("Order id returned");

    // Cart is now empty
    let resp = client
        .get(format!("{}/users/shopping_cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart.as_array().map(Vec::len), Some(0));

    // Order shows up in history with a price snapshot
    let resp = client
        .get(format!("{}/users/orders", base_url()))
        .send()
        .await
        .expect("Failed to get orders");
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    let order = orders
        .as_array()
        .and_then(|o| o.iter().find(|o| o["id"].as_i64() == Some(order_id)))
        .expect("Placed order appears in history");
    assert!(!order["lines"].as_array().expect("Order has lines").is_empty());
}

#[tokio::test]
#[ignore = "Requires a running server, database, and seeded stock"]
async fn test_wishlist_roundtrip() {
    let client = logged_in_client().await;
    let Some((artwork_id, _)) = artwork_in_stock(&client).await else {
        panic!("No artwork with stock available; seed the catalog first");
    };

    let resp = client
        .post(format!("{}/users/wishlist/add", base_url()))
        .json(&json!({ "artwork_id": artwork_id }))
        .send()
        .await
        .expect("Failed to add to wishlist");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/users/wishlist", base_url()))
        .send()
        .await
        .expect("Failed to get wishlist");
    let wishlist: Value = resp.json().await.expect("Failed to parse wishlist");
    assert!(
        wishlist
            .as_array()
            .expect("Wishlist is an array")
            .iter()
            .any(|a| a["id"].as_i64() == Some(i64::from(artwork_id)))
    );

    let resp = client
        .post(format!("{}/users/wishlist/remove", base_url()))
        .json(&json!({ "artwork_id": artwork_id }))
        .send()
        .await
        .expect("Failed to remove from wishlist");
    assert_eq!(resp.status(), StatusCode::OK);
}
