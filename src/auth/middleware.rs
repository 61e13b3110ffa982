//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation and role gates

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::models::CurrentUser;
use crate::error::ApiError;
use crate::models::Role;

/// Cookie set at login, read when no Authorization header is present
pub const TOKEN_COOKIE: &str = "token";

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// Middleware that authenticates the request and resolves the live account.
///
/// The bearer header takes precedence over the cookie. The subject is looked
/// up in storage on every request, so a deleted account fails closed even
/// while its token is still valid.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .or_else(|| cookie_token(req.headers()))
        .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    let claims = state
        .tokens
        .verify_access_token(&token)
        .map_err(|_| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    let user = state
        .db
        .find_user_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(req).await)
}

/// Check the authenticated identity against an allow-list of roles
fn authorize(req: &Request, allowed: &[Role]) -> Result<(), ApiError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))?;

    if !allowed.contains(&user.role) {
        return Err(ApiError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role.as_str()
        )));
    }

    Ok(())
}

/// Gate for admin-only routes; layered after `authenticate`
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&req, &[Role::Admin])?;
    Ok(next.run(req).await)
}

/// Gate for store-owner routes; layered after `authenticate`
pub async fn require_store_owner(req: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&req, &[Role::StoreOwner])?;
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
}
