//! Cross-cutting services: authentication, outbound email, reset tokens,
//! translation.

pub mod auth;
pub mod email;
pub mod reset_token;
pub mod translate;

pub use auth::AuthError;
pub use email::{EmailError, EmailService};
pub use reset_token::{ResetTokenError, ResetTokenService};
pub use translate::{TranslationClient, TranslationError};
