//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database ping)
//!
//! # Session & password
//! POST /login                   - Log in
//! GET  /logged_in               - Current user
//! GET  /log_out                 - Destroy session
//! POST /forgot_password         - Request a reset mail (always 200)
//! POST /reset_password          - Set a new password (x-reset-token header)
//!
//! # Catalog (public, response-cached when enabled)
//! GET  /categories              - All categories
//! GET  /search_artworks         - Filtered search
//! GET  /featured                - Featured artworks
//! GET  /newest                  - Newest artworks
//! GET  /most_wishlisted         - Most wishlisted artworks
//! GET  /artwork?id              - One artwork
//! GET  /reviews?id              - Approved reviews of an artwork
//!
//! # Misc public
//! POST /message_to_administrator - Contact form
//! POST /translate               - Translation passthrough
//! POST /graphql                 - GraphQL catalog queries
//! GET  /images/*                - Static artwork media
//!
//! # Account (/users, requires login except new_user)
//! POST /users/new_user          - Register
//! GET  /users/shopping_cart     - Cart contents
//! PUT  /users/shopping_cart     - Replace cart
//! POST /users/shopping_cart/add | increase | decrease | remove
//! GET  /users/wishlist          - Wishlist
//! POST /users/wishlist/add | remove
//! POST /users/order             - Checkout
//! GET  /users/orders            - Order history
//! PUT  /users/user_data         - Profile update
//! PUT  /users/password          - Password change
//! POST /users/review            - Submit a review
//!
//! # Admin (/admin, requires admin)
//! GET  /admin/reviews/pending   - Moderation queue
//! PUT  /admin/review/approve | remove
//! GET  /admin/orders            - All orders
//! GET  /admin/messages          - Contact inbox
//! POST /admin/message/reply     - Reply by email
//! GET  /admin/users             - All accounts
//! POST /admin/artwork           - Create artwork
//! PUT  /admin/artwork           - Update artwork (fields, tags, featured)
//! DELETE /admin/artwork?id      - Soft-remove artwork
//! POST /admin/artwork/thumbnail - Image upload (multipart)
//! PUT  /admin/featured          - Toggle featured
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod contact;
pub mod graphql;
pub mod translate;

use axum::{
    Json,
    Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::cache;
use crate::state::AppState;

/// Liveness check.
///
/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// Readiness check: pings the database.
///
/// GET /health/ready
pub async fn readiness(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(|e| AppError::Internal(format!("database ping: {e}")))?;
    Ok(Json(json!({ "ready": true })))
}

/// Public catalog routes, behind the response cache when enabled.
fn catalog_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/search_artworks", get(catalog::search_artworks))
        .route("/featured", get(catalog::featured))
        .route("/newest", get(catalog::newest))
        .route("/most_wishlisted", get(catalog::most_wishlisted))
        .route("/artwork", get(catalog::artwork))
        .route("/reviews", get(catalog::reviews))
        .layer(from_fn_with_state(
            state.response_cache().clone(),
            cache::response_cache,
        ))
}

/// Account routes under `/users`.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/new_user", post(account::new_user))
        .route(
            "/shopping_cart",
            get(account::shopping_cart).put(account::replace_shopping_cart),
        )
        .route("/shopping_cart/add", post(account::add_to_cart))
        .route("/shopping_cart/increase", post(account::increase_cart))
        .route("/shopping_cart/decrease", post(account::decrease_cart))
        .route("/shopping_cart/remove", post(account::remove_from_cart))
        .route("/wishlist", get(account::wishlist))
        .route("/wishlist/add", post(account::add_to_wishlist))
        .route("/wishlist/remove", post(account::remove_from_wishlist))
        .route("/order", post(account::place_order))
        .route("/orders", get(account::orders))
        .route("/user_data", put(account::update_user_data))
        .route("/password", put(account::change_password))
        .route("/review", post(account::submit_review))
}

/// Admin routes under `/admin`.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews/pending", get(admin::pending_reviews))
        .route("/review/approve", put(admin::approve_review))
        .route("/review/remove", put(admin::remove_review))
        .route("/orders", get(admin::all_orders))
        .route("/messages", get(admin::messages))
        .route("/message/reply", post(admin::reply_to_message))
        .route("/users", get(admin::all_users))
        .route(
            "/artwork",
            post(admin::create_artwork)
                .put(admin::update_artwork)
                .delete(admin::remove_artwork),
        )
        .route("/artwork/thumbnail", post(admin::upload_thumbnail))
        .route("/featured", put(admin::set_featured))
}

/// Create all application routes.
pub fn routes(state: AppState) -> Router {
    let schema = graphql::build_schema(state.clone());

    let public = Router::new()
        .route("/login", post(auth::login))
        .route("/logged_in", get(auth::logged_in))
        .route("/log_out", get(auth::log_out))
        .route("/forgot_password", post(auth::forgot_password))
        .route("/reset_password", post(auth::reset_password))
        .route(
            "/message_to_administrator",
            post(contact::message_to_administrator),
        )
        .route("/translate", post(translate::translate))
        .merge(catalog_routes(&state));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(public)
        .nest("/users", user_routes())
        .nest("/admin", admin_routes())
        .with_state(state)
        .merge(
            Router::new()
                .route("/graphql", post(graphql::graphql_handler))
                .with_state(schema),
        )
}
