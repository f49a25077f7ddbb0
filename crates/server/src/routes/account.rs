//! Account route handlers: registration, cart, wishlist, orders, profile.
//!
//! Everything here except registration requires a logged-in session.
//! Cart mutations move stock: adding reserves units out of the artwork's
//! stock, removing returns them, so a cart line is a hold, not a wish.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, instrument};

use atelier_core::ArtworkId;

use crate::db::{
    CartRepository, OrderRepository, ReviewRepository, UserRepository, WishlistRepository,
    users::ProfileUpdate,
};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::middleware::auth::set_current_user;
use crate::models::{
    ArtworkSummary, CartEntry, CartLine, CurrentUser, InvoiceDetails, OrderWithLines, PublicUser,
};
use crate::routes::catalog::enrich_artworks;
use crate::services::auth::{self, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Cart adjustment form; quantity defaults to one.
#[derive(Debug, Deserialize)]
pub struct CartAdjustForm {
    pub artwork_id: ArtworkId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// An artwork-id-only request body, shared by cart removal and the
/// wishlist operations.
#[derive(Debug, Deserialize)]
pub struct ArtworkRefForm {
    pub artwork_id: ArtworkId,
}

/// Profile update form; absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UserDataForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Password change form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
}

/// Review submission form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub artwork_id: ArtworkId,
    pub text: String,
}

// =============================================================================
// Registration
// =============================================================================

/// Register a new account.
///
/// POST /users/new_user
///
/// The only unguarded route under `/users`; registration needs no
/// session.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn new_user(
    State(state): State<AppState>,
    Json(form): Json<NewUserForm>,
) -> Result<impl IntoResponse> {
    let user = auth::register(
        state.pool(),
        Registration {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password: form.password,
            address: form.address,
            phone: form.phone,
        },
    )
    .await?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

// =============================================================================
// Shopping Cart
// =============================================================================

/// The current cart contents.
///
/// GET /users/shopping_cart
pub async fn shopping_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<CartLine>>> {
    let lines = CartRepository::new(state.pool()).items(user.id).await?;
    Ok(Json(lines))
}

/// Replace the cart with a new list of entries.
///
/// PUT /users/shopping_cart
///
/// Used to adopt a cart assembled before login. Quantities are clamped
/// to available stock; the resulting cart is returned.
#[instrument(skip(state, user, entries), fields(user_id = %user.id))]
pub async fn replace_shopping_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(entries): Json<Vec<CartEntry>>,
) -> Result<Json<Vec<CartLine>>> {
    let lines = CartRepository::new(state.pool())
        .replace(user.id, &entries)
        .await?;
    Ok(Json(lines))
}

/// Add units of an artwork to the cart, reserving them from stock.
///
/// POST /users/shopping_cart/add
#[instrument(skip(state, user), fields(user_id = %user.id, artwork_id = %form.artwork_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<CartAdjustForm>,
) -> Result<Json<Vec<CartLine>>> {
    let repo = CartRepository::new(state.pool());
    repo.reserve(user.id, form.artwork_id, form.quantity).await?;
    Ok(Json(repo.items(user.id).await?))
}

/// Increase a cart line, reserving more units.
///
/// POST /users/shopping_cart/increase
pub async fn increase_cart(
    state: State<AppState>,
    user: RequireUser,
    form: Json<CartAdjustForm>,
) -> Result<Json<Vec<CartLine>>> {
    add_to_cart(state, user, form).await
}

/// Decrease a cart line, returning units to stock.
///
/// POST /users/shopping_cart/decrease
#[instrument(skip(state, user), fields(user_id = %user.id, artwork_id = %form.artwork_id))]
pub async fn decrease_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<CartAdjustForm>,
) -> Result<Json<Vec<CartLine>>> {
    let repo = CartRepository::new(state.pool());
    repo.release(user.id, form.artwork_id, form.quantity).await?;
    Ok(Json(repo.items(user.id).await?))
}

/// Drop a cart line entirely, returning all its units to stock.
///
/// POST /users/shopping_cart/remove
#[instrument(skip(state, user), fields(user_id = %user.id, artwork_id = %form.artwork_id))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ArtworkRefForm>,
) -> Result<Json<Vec<CartLine>>> {
    let repo = CartRepository::new(state.pool());
    repo.remove(user.id, form.artwork_id).await?;
    Ok(Json(repo.items(user.id).await?))
}

// =============================================================================
// Wishlist
// =============================================================================

/// The current wishlist.
///
/// GET /users/wishlist
pub async fn wishlist(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<ArtworkSummary>>> {
    let rows = WishlistRepository::new(state.pool()).list(user.id).await?;
    let enriched = enrich_artworks(&state, rows).await?;
    Ok(Json(enriched))
}

/// Add an artwork to the wishlist.
///
/// POST /users/wishlist/add
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ArtworkRefForm>,
) -> Result<impl IntoResponse> {
    WishlistRepository::new(state.pool())
        .add(user.id, form.artwork_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Remove an artwork from the wishlist.
///
/// POST /users/wishlist/remove
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ArtworkRefForm>,
) -> Result<impl IntoResponse> {
    WishlistRepository::new(state.pool())
        .remove(user.id, form.artwork_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Orders
// =============================================================================

/// Place an order from the current cart.
///
/// POST /users/order
///
/// Stock was already reserved when the cart was filled; checkout
/// snapshots the cart into an order and empties it.
#[instrument(skip(state, user, invoice), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(invoice): Json<InvoiceDetails>,
) -> Result<impl IntoResponse> {
    let order_id = OrderRepository::new(state.pool())
        .checkout(user.id, &invoice)
        .await?;

    info!(order_id = %order_id, "order placed");
    Ok((StatusCode::CREATED, Json(json!({ "order_id": order_id }))))
}

/// The user's order history with line items.
///
/// GET /users/orders
pub async fn orders(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderWithLines>>> {
    let rows = OrderRepository::new(state.pool()).for_user(user.id).await?;
    Ok(Json(rows))
}

// =============================================================================
// Profile
// =============================================================================

/// Update profile fields.
///
/// PUT /users/user_data
///
/// Refreshes the session copy of the user so later requests see the new
/// name.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_user_data(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Json(form): Json<UserDataForm>,
) -> Result<Json<PublicUser>> {
    let repo = UserRepository::new(state.pool());
    repo.update_profile(
        user.id,
        &ProfileUpdate {
            first_name: form.first_name,
            last_name: form.last_name,
            address: form.address,
            phone: form.phone,
        },
    )
    .await?;

    let updated = repo
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;
    set_current_user(&session, &CurrentUser::from(&updated))
        .await
        .map_err(|e| AppError::Internal(format!("session write: {e}")))?;

    Ok(Json(PublicUser::from(updated)))
}

/// Change the password, verifying the current one.
///
/// PUT /users/password
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ChangePasswordForm>,
) -> Result<impl IntoResponse> {
    let email = atelier_core::Email::parse(&user.email)
        .map_err(|e| AppError::Internal(format!("session email: {e}")))?;
    auth::change_password(
        state.pool(),
        &email,
        &form.current_password,
        &form.new_password,
    )
    .await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Reviews
// =============================================================================

/// Submit a review; it enters the moderation queue unapproved.
///
/// POST /users/review
#[instrument(skip(state, user, form), fields(user_id = %user.id, artwork_id = %form.artwork_id))]
pub async fn submit_review(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ReviewForm>,
) -> Result<impl IntoResponse> {
    let text = form.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("review text is required".to_string()));
    }

    let id = ReviewRepository::new(state.pool())
        .create(user.id, form.artwork_id, text)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "review_id": id }))))
}
