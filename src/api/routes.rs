//! API Router
//! Mission: Wire every endpoint to its handler, with auth gates per route group

use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use validator::Validate;

use crate::auth::{authenticate, require_admin, require_store_owner, TokenService};
use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;

use super::{admin, auth, ratings, stores, users};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenService>,
    pub config: Arc<Config>,
}

/// JSON extractor that runs the payload's validation rules before the
/// handler sees it. Malformed bodies and failed field checks both surface
/// as [`ApiError`], so clients always get the standard error envelope.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query extractor that keeps rejections inside the standard error
/// envelope. A malformed query string (`?page=abc`) surfaces as
/// [`ApiError`] the same way a malformed body does through
/// [`ValidatedJson`].
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    // Admin-only management surface
    let admin_routes = Router::new()
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/stores", post(stores::create_store))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route_layer(from_fn(require_admin));

    // Store owner's view of their own stores
    let owner_routes = Router::new()
        .route("/api/stores/my/store", get(stores::my_stores))
        .route_layer(from_fn(require_store_owner));

    // Everything any signed-in user may call
    let protected_routes = Router::new()
        .route("/api/auth/password", put(auth::change_password))
        .route("/api/ratings", post(ratings::submit_rating))
        .route("/api/ratings/my", get(ratings::my_ratings))
        .route("/api/ratings/:id", put(ratings::update_rating))
        .route("/api/ratings/store/:store_id", get(ratings::rating_for_store))
        .merge(admin_routes)
        .merge(owner_routes)
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/stores", get(stores::list_stores))
        .route("/api/stores/:id", get(stores::get_store));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(from_fn(crate::middleware::request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ===== Service-level handlers =====

async fn root() -> &'static str {
    "RateHub API is running"
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
