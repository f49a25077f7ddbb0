//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. `TraceLayer` (request tracing)
//! 2. `CorsLayer` (allow the configured client origin)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Response cache (GET responses, when enabled)
//!
//! Authentication is enforced per-route via the extractors in [`auth`]
//! rather than a blanket guard, because `/` routes are public while
//! `/users` and `/admin` are not.

pub mod auth;
pub mod cache;
pub mod session;

pub use auth::{AuthRejection, OptionalUser, RequireAdmin, RequireUser};
pub use cache::ResponseCache;
pub use session::create_session_layer;
