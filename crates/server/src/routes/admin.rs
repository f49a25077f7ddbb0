//! Admin route handlers: moderation, catalog management, contact replies.
//!
//! Every handler takes [`RequireAdmin`]; the router additionally mounts
//! these under `/admin`.

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use atelier_core::{ArtworkId, CategoryId, MessageId, Price, ReviewId};

use crate::db::{
    ArtworkRepository, MessageRepository, OrderRepository, ReviewRepository, TagRepository,
    UserRepository,
    artworks::{ArtworkUpdate, NewArtwork},
};
use crate::error::{AppError, Result};
use crate::media;
use crate::middleware::RequireAdmin;
use crate::models::{AdminMessage, ArtworkSummary, OrderWithLines, PublicUser, Review};
use crate::routes::catalog::{IdQuery, enrich_artworks};
use crate::services::EmailService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Review moderation form data.
#[derive(Debug, Deserialize)]
pub struct ReviewModerationForm {
    pub id: ReviewId,
}

/// Contact reply form data.
#[derive(Debug, Deserialize)]
pub struct MessageReplyForm {
    pub id: MessageId,
    pub subject: String,
    pub body: String,
}

/// New artwork form data.
#[derive(Debug, Deserialize)]
pub struct NewArtworkForm {
    pub title: String,
    pub artist_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Artwork update form; absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct ArtworkUpdateForm {
    pub id: ArtworkId,
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    /// Full replacement tag set; absent leaves tags untouched.
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
}

/// Featured toggle form data.
#[derive(Debug, Deserialize)]
pub struct FeaturedForm {
    pub artwork_id: ArtworkId,
    pub featured: bool,
}

// =============================================================================
// Review Moderation
// =============================================================================

/// Reviews waiting for moderation, oldest first.
///
/// GET /admin/reviews/pending
pub async fn pending_reviews(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Review>>> {
    let rows = ReviewRepository::new(state.pool()).pending().await?;
    Ok(Json(rows))
}

/// Approve a review, making it publicly visible.
///
/// PUT /admin/review/approve
#[instrument(skip(state, _admin), fields(review_id = %form.id))]
pub async fn approve_review(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(form): Json<ReviewModerationForm>,
) -> Result<impl IntoResponse> {
    ReviewRepository::new(state.pool()).approve(form.id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Reject a review, removing it from the queue.
///
/// PUT /admin/review/remove
#[instrument(skip(state, _admin), fields(review_id = %form.id))]
pub async fn remove_review(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(form): Json<ReviewModerationForm>,
) -> Result<impl IntoResponse> {
    ReviewRepository::new(state.pool())
        .soft_remove(form.id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Orders and Users
// =============================================================================

/// All orders with line items.
///
/// GET /admin/orders
pub async fn all_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<OrderWithLines>>> {
    let rows = OrderRepository::new(state.pool()).all().await?;
    Ok(Json(rows))
}

/// All user accounts.
///
/// GET /admin/users
pub async fn all_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<PublicUser>>> {
    let rows = UserRepository::new(state.pool()).list().await?;
    Ok(Json(rows.into_iter().map(PublicUser::from).collect()))
}

// =============================================================================
// Contact Messages
// =============================================================================

/// All contact-form messages, newest first.
///
/// GET /admin/messages
pub async fn messages(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminMessage>>> {
    let rows = MessageRepository::new(state.pool()).list().await?;
    Ok(Json(rows))
}

/// Reply to a contact-form message by email and mark it answered.
///
/// POST /admin/message/reply
///
/// The mail goes out fire-and-forget; the message is marked answered
/// once the send is queued.
#[instrument(skip(state, _admin, form), fields(message_id = %form.id))]
pub async fn reply_to_message(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(form): Json<MessageReplyForm>,
) -> Result<impl IntoResponse> {
    let email_service = state
        .email()
        .ok_or_else(|| AppError::Unavailable("email is not configured".to_string()))?
        .clone();

    let MessageReplyForm { id, subject, body } = form;

    let repo = MessageRepository::new(state.pool());
    let message = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("message {id}")))?;

    EmailService::send_spawned(
        async move {
            email_service
                .send_admin_reply(&message.email, &message.name, &subject, &body)
                .await
        },
        "contact reply email",
    );

    repo.mark_answered(id).await?;
    info!("contact message answered");
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Catalog Management
// =============================================================================

/// Create an artwork with its tag set and featured flag.
///
/// POST /admin/artwork
#[instrument(skip(state, _admin, form), fields(title = %form.title))]
pub async fn create_artwork(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(form): Json<NewArtworkForm>,
) -> Result<impl IntoResponse> {
    let price = Price::new(form.price).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if form.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_string(),
        ));
    }

    let artwork = ArtworkRepository::new(state.pool())
        .create(&NewArtwork {
            title: form.title,
            artist_name: form.artist_name,
            price,
            quantity: form.quantity,
            category_id: form.category_id,
            description: form.description,
        })
        .await?;

    TagRepository::new(state.pool())
        .reconcile(artwork.id, &form.tags)
        .await?;
    if form.featured {
        ArtworkRepository::new(state.pool())
            .set_featured(artwork.id, true)
            .await?;
    }

    info!(artwork_id = %artwork.id, "artwork created");
    let summary = enriched_one(&state, artwork.id).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Update an artwork; absent fields keep their value.
///
/// PUT /admin/artwork
///
/// A present `tags` list replaces the artwork's tag set; a present
/// `featured` flag toggles the showcase.
#[instrument(skip(state, _admin, form), fields(artwork_id = %form.id))]
pub async fn update_artwork(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(form): Json<ArtworkUpdateForm>,
) -> Result<Json<ArtworkSummary>> {
    let price = form
        .price
        .map(Price::new)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if form.quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_string(),
        ));
    }

    let repo = ArtworkRepository::new(state.pool());
    repo.update(
        form.id,
        &ArtworkUpdate {
            title: form.title,
            artist_name: form.artist_name,
            price,
            quantity: form.quantity,
            category_id: form.category_id,
            description: form.description,
        },
    )
    .await?;

    if let Some(tags) = &form.tags {
        TagRepository::new(state.pool())
            .reconcile(form.id, tags)
            .await?;
    }
    if let Some(featured) = form.featured {
        repo.set_featured(form.id, featured).await?;
    }

    let summary = enriched_one(&state, form.id).await?;
    Ok(Json(summary))
}

/// Soft-remove an artwork from the catalog.
///
/// DELETE /admin/artwork?id=...
#[instrument(skip(state, _admin), fields(artwork_id = %query.id))]
pub async fn remove_artwork(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse> {
    ArtworkRepository::new(state.pool())
        .soft_remove(query.id)
        .await?;
    info!("artwork removed");
    Ok(Json(json!({ "success": true })))
}

/// Toggle an artwork's featured flag.
///
/// PUT /admin/featured
#[instrument(skip(state, _admin), fields(artwork_id = %form.artwork_id, featured = form.featured))]
pub async fn set_featured(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(form): Json<FeaturedForm>,
) -> Result<impl IntoResponse> {
    ArtworkRepository::new(state.pool())
        .set_featured(form.artwork_id, form.featured)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Upload an artwork image.
///
/// POST /admin/artwork/thumbnail
///
/// Multipart form with an `artwork_id` field and one file field. The
/// file lands under `images/{artwork_id}/` and is served statically.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut artwork_id: Option<ArtworkId> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("artwork_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid artwork_id: {e}")))?;
                let id: i32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest("invalid artwork_id".to_string()))?;
                artwork_id = Some(ArtworkId::new(id));
            }
            _ => {
                let Some(filename) = field.file_name().map(ToOwned::to_owned) else {
                    continue;
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid file field: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            }
        }
    }

    let artwork_id =
        artwork_id.ok_or_else(|| AppError::BadRequest("artwork_id is required".to_string()))?;
    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("an image file is required".to_string()))?;

    // Reject uploads for artworks that don't exist.
    ArtworkRepository::new(state.pool())
        .get(artwork_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("artwork {artwork_id}")))?;

    let path = media::save_image(&state.config().media_root, artwork_id, &filename, &bytes).await?;
    info!(artwork_id = %artwork_id, path = %path, "image uploaded");
    Ok((StatusCode::CREATED, Json(json!({ "path": path }))))
}

/// Load one artwork with its enrichment, after a mutation.
async fn enriched_one(state: &AppState, id: ArtworkId) -> Result<ArtworkSummary> {
    let artwork = ArtworkRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("artwork {id}")))?;
    let mut enriched = enrich_artworks(state, vec![artwork]).await?;
    enriched
        .pop()
        .ok_or_else(|| AppError::Internal("artwork enrichment dropped a row".to_string()))
}
