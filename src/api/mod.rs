//! HTTP API Layer
//! Mission: REST endpoints for accounts, stores, ratings, and admin views

pub mod admin;
pub mod auth;
pub mod ratings;
pub mod routes;
pub mod stores;
pub mod users;

pub use routes::{create_router, ApiQuery, AppState, ValidatedJson};
