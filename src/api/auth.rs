//! Authentication Endpoints
//! Mission: Registration, login, token refresh, and password changes

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::models::{
    ChangePasswordRequest, LoginData, LoginRequest, RefreshRequest, RegisterRequest, TokenPair,
};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{CurrentUser, TOKEN_COOKIE};
use crate::error::{conflict_on_unique, ApiError};
use crate::models::{PublicUser, Role};
use crate::response::ApiResponse;

use super::{AppState, ValidatedJson};

/// Register a new account - POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PublicUser>>), ApiError> {
    let password_hash = hash_password(&payload.password)?;

    let user = state
        .db
        .create_user(
            &payload.name,
            &payload.email,
            &password_hash,
            Role::User,
            payload.address.as_deref(),
        )
        .map_err(|err| conflict_on_unique(err, "Email already registered"))?;

    info!("✅ User registered: {}", user.email);

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Registration successful", PublicUser::from_user(&user)),
    ))
}

/// Login - POST /api/auth/login
///
/// Unknown email and wrong password produce the identical response, so the
/// endpoint cannot be used to probe which emails have accounts.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginData>>), ApiError> {
    info!("🔐 Login attempt: {}", payload.email);

    let user = state
        .db
        .find_user_by_email(&payload.email)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!("❌ Failed login attempt: {}", payload.email);
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let pair = state.tokens.issue_pair(&user.id, user.role)?;

    let cookie = Cookie::build((TOKEN_COOKIE, pair.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .build();

    info!("✅ Login successful: {} ({})", user.email, user.role.as_str());

    let data = LoginData {
        user: PublicUser::from_user(&user),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };

    Ok((jar.add(cookie), ApiResponse::ok("Login successful", data)))
}

/// Exchange a refresh token for a fresh pair - POST /api/auth/refresh
///
/// Every failure mode collapses to the same 401, whether the token is
/// malformed, expired, or its subject no longer exists.
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid refresh token".to_string());

    let claims = state
        .tokens
        .verify_refresh_token(&payload.refresh_token)
        .map_err(|_| invalid())?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| invalid())?;

    // Re-resolve the account so a deleted user cannot keep minting tokens,
    // and so the new access token carries the user's current role
    let user = state.db.find_user_by_id(&user_id)?.ok_or_else(invalid)?;

    let pair = state.tokens.issue_pair(&user.id, user.role)?;

    Ok(ApiResponse::ok("Token refresh successful", pair))
}

/// Change the caller's password - PUT /api/auth/password
///
/// Outstanding tokens stay valid until natural expiry; there is no
/// revocation list to invalidate them early.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = state
        .db
        .find_user_by_id(&current.id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!("❌ Password change with wrong current password: {}", user.email);
        return Err(ApiError::Unauthorized(
            "Incorrect current password".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.new_password)?;
    if !state.db.update_password_hash(&user.id, &password_hash)? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!("🔑 Password updated: {}", user.email);

    Ok(ApiResponse::message("Password updated successfully"))
}
