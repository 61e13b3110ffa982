//! Rating Endpoints
//! Mission: Submit, update, and read back 1-5 star ratings

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::{conflict_on_unique, ApiError};
use crate::models::{Rating, RatingWithStore, UserRating};
use crate::response::ApiResponse;

use super::{AppState, ValidatedJson};

const ALREADY_RATED: &str =
    "You have already rated this store. Please update your existing rating.";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRatingRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i64,
}

/// Submit a rating - POST /api/ratings
///
/// One rating per user per store; a second submission conflicts instead of
/// overwriting, and the client is pointed at the update endpoint.
pub async fn submit_rating(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RatingWithStore>>), ApiError> {
    if !state.db.store_exists(&payload.store_id)? {
        return Err(ApiError::NotFound("Store not found".to_string()));
    }

    let rating = state
        .db
        .insert_rating(&current.id, &payload.store_id, payload.rating)
        .map_err(|err| conflict_on_unique(err, ALREADY_RATED))?;

    let with_store = state
        .db
        .rating_with_store(&rating.id)?
        .context("Rating missing right after insert")?;

    info!(
        "⭐ Rating submitted: {} gave {} to store {}",
        current.email, payload.rating, payload.store_id
    );

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Rating submitted successfully", with_store),
    ))
}

/// Update an existing rating - PUT /api/ratings/:id
pub async fn update_rating(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateRatingRequest>,
) -> Result<Json<ApiResponse<RatingWithStore>>, ApiError> {
    let not_found = || ApiError::NotFound("Rating not found".to_string());

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let existing = state.db.rating_by_id(&id)?.ok_or_else(not_found)?;

    // Only the author may change a rating; admins get no override here
    if existing.user_id != current.id {
        return Err(ApiError::Forbidden(
            "Not authorized to update this rating".to_string(),
        ));
    }

    if !state.db.set_rating_value(&id, payload.rating)? {
        return Err(not_found());
    }

    let with_store = state
        .db
        .rating_with_store(&id)?
        .context("Rating missing right after update")?;

    Ok(ApiResponse::ok("Rating updated successfully", with_store))
}

/// List the caller's ratings, newest first - GET /api/ratings/my
pub async fn my_ratings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<UserRating>>>, ApiError> {
    let ratings = state.db.ratings_for_user(&current.id)?;

    Ok(ApiResponse::ok("My ratings retrieved successfully", ratings))
}

/// Get the caller's rating for one store - GET /api/ratings/store/:store_id
///
/// `data` is `null` when the caller has not rated the store; an unknown
/// store id reads the same as an unrated one.
pub async fn rating_for_store(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(store_id): Path<String>,
) -> Result<Json<ApiResponse<Option<Rating>>>, ApiError> {
    let rating = match Uuid::parse_str(&store_id) {
        Ok(store_id) => state.db.find_rating(&current.id, &store_id)?,
        Err(_) => None,
    };

    Ok(ApiResponse::ok(
        "Rating for store retrieved successfully",
        rating,
    ))
}
