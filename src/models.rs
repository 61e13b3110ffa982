//! Core Domain Models
//! Mission: Define the user, store, and rating shapes shared across the API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Account roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin, // Full platform management
    #[serde(rename = "STORE_OWNER")]
    StoreOwner, // Sees ratings for owned stores
    #[serde(rename = "USER")]
    User, // Browses and rates stores
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::StoreOwner => "STORE_OWNER",
            Role::User => "USER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "STORE_OWNER" => Some(Role::StoreOwner),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub address: Option<String>,
    pub created_at: String,
}

/// User response (sanitized)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub address: Option<String>,
    pub created_at: String,
}

impl PublicUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            address: user.address.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// Relation counts rendered under the `_count` key
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserCounts {
    pub stores: i64,
    pub ratings: i64,
}

/// User list entry with relation counts
#[derive(Debug, Clone, Serialize)]
pub struct UserWithCounts {
    #[serde(flatten)]
    pub user: PublicUser,
    #[serde(rename = "_count")]
    pub counts: UserCounts,
}

/// Full user view with owned stores and submitted ratings
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: PublicUser,
    pub stores: Vec<Store>,
    pub ratings: Vec<UserRating>,
}

/// Store record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Uuid,
    pub created_at: String,
}

/// Owner contact shown alongside a store
#[derive(Debug, Clone, Serialize)]
pub struct OwnerBrief {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreCounts {
    pub ratings: i64,
}

/// Store list entry with owner, rating count, and average
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    #[serde(flatten)]
    pub store: Store,
    pub owner: OwnerBrief,
    #[serde(rename = "_count")]
    pub counts: StoreCounts,
    pub average_rating: f64,
}

/// Full store view with its ratings
///
/// `owner` is omitted on the owner's own dashboard, where it would be
/// redundant with the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerBrief>,
    pub ratings: Vec<StoreRatingEntry>,
    pub average_rating: f64,
}

/// Rating row under a store view, with the rater's name
#[derive(Debug, Clone, Serialize)]
pub struct StoreRatingEntry {
    #[serde(flatten)]
    pub rating: Rating,
    pub user: RaterBrief,
}

#[derive(Debug, Clone, Serialize)]
pub struct RaterBrief {
    pub name: String,
}

/// Rating record (1-5 stars, one per user per store)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    #[serde(rename = "rating")]
    pub value: i64,
    pub created_at: String,
}

/// Rating response with the rated store's name
#[derive(Debug, Clone, Serialize)]
pub struct RatingWithStore {
    #[serde(flatten)]
    pub rating: Rating,
    pub store: StoreName,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreName {
    pub name: String,
}

/// Rating entry in the caller's own history
#[derive(Debug, Clone, Serialize)]
pub struct UserRating {
    #[serde(flatten)]
    pub rating: Rating,
    pub store: StoreRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreRef {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

/// Pagination metadata for list endpoints
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + limit as i64 - 1) / limit as i64
        };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Paged user listing
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<UserWithCounts>,
    pub pagination: Pagination,
}

/// Paged store listing
#[derive(Debug, Clone, Serialize)]
pub struct StorePage {
    pub stores: Vec<StoreSummary>,
    pub pagination: Pagination,
}

/// Platform totals for the admin dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
    pub user_role_distribution: BTreeMap<String, i64>,
}
