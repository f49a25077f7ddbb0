//! Domain models: database row structs and request/response shapes.

pub mod artwork;
pub mod cart;
pub mod message;
pub mod order;
pub mod review;
pub mod user;

pub use artwork::{
    Artwork, ArtworkFilter, ArtworkSummary, Category, DEFAULT_PAGE_SIZE, SortOrder,
};
pub use cart::{CartEntry, CartLine};
pub use message::AdminMessage;
pub use order::{InvoiceDetails, Order, OrderLine, OrderWithLines};
pub use review::Review;
pub use user::{CurrentUser, PublicUser, User, session_keys};
