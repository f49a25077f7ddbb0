//! Contact-form message models.

use atelier_core::MessageId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A message sent to the administrators through the contact form.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminMessage {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub body: String,
    pub answered: bool,
    pub created_at: DateTime<Utc>,
}
