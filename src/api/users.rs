//! User Management Endpoints (admin only)
//! Mission: Account listing, inspection, and creation with any role

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::validate_password_strength;
use crate::auth::password::hash_password;
use crate::db::{SortOrder, UserFilter};
use crate::error::{conflict_on_unique, ApiError};
use crate::models::{Pagination, PublicUser, Role, UserDetail, UserPage};
use crate::response::ApiResponse;

use super::{ApiQuery, AppState, ValidatedJson};

/// Query parameters for the user listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Admin-created account; unlike registration, any role may be assigned
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 60, message = "Name must be between 2 and 60 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"),
        custom(function = validate_password_strength)
    )]
    pub password: String,
    #[validate(length(max = 400, message = "Address must be at most 400 characters"))]
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// List users - GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> Result<Json<ApiResponse<UserPage>>, ApiError> {
    let role = match query.role.as_deref() {
        Some(value) => Some(
            Role::from_str(value)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid role: {}", value)))?,
        ),
        None => None,
    };

    let filter = UserFilter {
        name: query.name,
        email: query.email,
        role,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(10).clamp(1, 100),
        sort_by: query.sort_by,
        sort_order: SortOrder::from_param(query.sort_order.as_deref()),
    };

    let (users, total) = state.db.list_users(&filter)?;
    let pagination = Pagination::new(total, filter.page, filter.limit);

    Ok(ApiResponse::ok(
        "Users retrieved successfully",
        UserPage { users, pagination },
    ))
}

/// Get one user with owned stores and submitted ratings - GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDetail>>, ApiError> {
    let not_found = || ApiError::NotFound("User not found".to_string());

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let detail = state.db.user_detail(&id)?.ok_or_else(not_found)?;

    Ok(ApiResponse::ok("User retrieved successfully", detail))
}

/// Create an account with an explicit role - POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PublicUser>>), ApiError> {
    let role = payload.role.unwrap_or(Role::User);
    let password_hash = hash_password(&payload.password)?;

    let user = state
        .db
        .create_user(
            &payload.name,
            &payload.email,
            &password_hash,
            role,
            payload.address.as_deref(),
        )
        .map_err(|err| conflict_on_unique(err, "Email already registered"))?;

    info!("✅ User created: {} ({})", user.email, user.role.as_str());

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("User created successfully", PublicUser::from_user(&user)),
    ))
}
