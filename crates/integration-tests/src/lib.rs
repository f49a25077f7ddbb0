//! Integration tests for the Atelier marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! docker compose up -d postgres
//! cargo run -p atelier-cli -- migrate
//!
//! # Start the server
//! cargo run -p atelier-server
//!
//! # Run integration tests (ignored by default)
//! cargo test -p atelier-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, login, sessions, password changes
//! - `catalog` - Public catalog listings and search
//! - `cart_orders` - Shopping cart, stock reservation, order placement
//! - `admin_access` - Admin surface authorization
//!
//! Tests target a live server; the base URL is read from `ATELIER_BASE_URL`
//! (default `http://localhost:3000`). Each test registers its own throwaway
//! account, so runs are independent and repeatable against the same database.
