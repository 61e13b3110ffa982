//! Store Endpoints
//! Mission: Public browsing plus admin creation and the owner's own view

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::CurrentUser;
use crate::db::{SortOrder, StoreFilter};
use crate::error::ApiError;
use crate::models::{Pagination, Store, StoreDetail, StorePage};
use crate::response::ApiResponse;

use super::{ApiQuery, AppState, ValidatedJson};

/// Query parameters for the store listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStoresQuery {
    pub name: Option<String>,
    pub address: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(custom(function = validate_store_email))]
    pub email: Option<String>,
    #[validate(length(max = 400, message = "Address must be at most 400 characters"))]
    pub address: Option<String>,
    pub owner_id: Uuid,
}

/// Store contact email is optional and may be blank
fn validate_store_email(email: &str) -> Result<(), ValidationError> {
    use validator::ValidateEmail;

    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Invalid email address".into()))
    }
}

/// List stores with ratings summary - GET /api/stores (public)
pub async fn list_stores(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListStoresQuery>,
) -> Result<Json<ApiResponse<StorePage>>, ApiError> {
    let filter = StoreFilter {
        name: query.name,
        address: query.address,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(10).clamp(1, 100),
        sort_by: query.sort_by,
        sort_order: SortOrder::from_param(query.sort_order.as_deref()),
    };

    let (stores, total) = state.db.list_stores(&filter)?;
    let pagination = Pagination::new(total, filter.page, filter.limit);

    Ok(ApiResponse::ok(
        "Stores retrieved successfully",
        StorePage { stores, pagination },
    ))
}

/// Get one store with its ratings - GET /api/stores/:id (public)
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StoreDetail>>, ApiError> {
    let not_found = || ApiError::NotFound("Store not found".to_string());

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let detail = state.db.store_detail(&id)?.ok_or_else(not_found)?;

    Ok(ApiResponse::ok("Store retrieved successfully", detail))
}

/// Create a store for an owner - POST /api/stores (admin)
pub async fn create_store(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Store>>), ApiError> {
    let owner = state
        .db
        .find_user_by_id(&payload.owner_id)?
        .ok_or_else(|| ApiError::NotFound("Owner not found".to_string()))?;

    let store = state.db.create_store(
        &payload.name,
        payload.email.as_deref(),
        payload.address.as_deref(),
        &owner.id,
    )?;

    info!("🏪 Store created: {} (owner: {})", store.name, owner.email);

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Store created successfully", store),
    ))
}

/// List the caller's stores with their ratings - GET /api/stores/my/store
///
/// Returns a list even though the route reads singular; an owner may hold
/// more than one store and the consumer decides how to present that.
pub async fn my_stores(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<StoreDetail>>>, ApiError> {
    let stores = state.db.owned_store_details(&current.id)?;

    Ok(ApiResponse::ok("My store retrieved successfully", stores))
}
