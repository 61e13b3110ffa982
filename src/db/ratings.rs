//! Rating Storage
//! Mission: One rating per user per store, enforced by the schema

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::Database;
use crate::models::{
    RaterBrief, Rating, RatingWithStore, StoreName, StoreRatingEntry, StoreRef, UserRating,
};

impl Database {
    /// Insert a new rating. A second rating for the same (user, store) pair
    /// hits the UNIQUE constraint; callers downcast the error to detect it.
    pub fn insert_rating(&self, user_id: &Uuid, store_id: &Uuid, value: i64) -> Result<Rating> {
        let rating = Rating {
            id: Uuid::new_v4(),
            user_id: *user_id,
            store_id: *store_id,
            value,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO ratings (id, user_id, store_id, rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                rating.id.to_string(),
                rating.user_id.to_string(),
                rating.store_id.to_string(),
                rating.value,
                rating.created_at,
            ],
        )?;

        Ok(rating)
    }

    pub fn rating_by_id(&self, id: &Uuid) -> Result<Option<Rating>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, store_id, rating, created_at
             FROM ratings WHERE id = ?1",
        )?;

        let rating = stmt
            .query_row(params![id.to_string()], |row| Self::row_to_rating(row))
            .optional()?;

        Ok(rating)
    }

    /// The caller's rating for one store, if any
    pub fn find_rating(&self, user_id: &Uuid, store_id: &Uuid) -> Result<Option<Rating>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, store_id, rating, created_at
             FROM ratings WHERE user_id = ?1 AND store_id = ?2",
        )?;

        let rating = stmt
            .query_row(params![user_id.to_string(), store_id.to_string()], |row| {
                Self::row_to_rating(row)
            })
            .optional()?;

        Ok(rating)
    }

    /// Replace the star value of an existing rating, keeping its identity
    pub fn set_rating_value(&self, id: &Uuid, value: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE ratings SET rating = ?1 WHERE id = ?2",
            params![value, id.to_string()],
        )?;

        Ok(rows > 0)
    }

    /// One rating joined with its store's name, for submit/update responses
    pub fn rating_with_store(&self, id: &Uuid) -> Result<Option<RatingWithStore>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT r.id, r.user_id, r.store_id, r.rating, r.created_at, s.name
             FROM ratings r
             JOIN stores s ON s.id = r.store_id
             WHERE r.id = ?1",
        )?;

        let rating = stmt
            .query_row(params![id.to_string()], |row| {
                Ok(RatingWithStore {
                    rating: Self::row_to_rating(row)?,
                    store: StoreName { name: row.get(5)? },
                })
            })
            .optional()?;

        Ok(rating)
    }

    /// The caller's rating history, newest first
    pub fn ratings_for_user(&self, user_id: &Uuid) -> Result<Vec<UserRating>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT r.id, r.user_id, r.store_id, r.rating, r.created_at,
                    s.id, s.name, s.address
             FROM ratings r
             JOIN stores s ON s.id = r.store_id
             WHERE r.user_id = ?1 ORDER BY r.created_at DESC",
        )?;

        let ratings = stmt
            .query_map(params![user_id.to_string()], |row| {
                let store_id: String = row.get(5)?;
                Ok(UserRating {
                    rating: Self::row_to_rating(row)?,
                    store: StoreRef {
                        id: Uuid::parse_str(&store_id).unwrap_or_default(),
                        name: row.get(6)?,
                        address: row.get(7)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ratings)
    }

    /// Every rating on one store with the rater's name, newest first
    pub fn ratings_for_store(&self, store_id: &Uuid) -> Result<Vec<StoreRatingEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT r.id, r.user_id, r.store_id, r.rating, r.created_at, u.name
             FROM ratings r
             JOIN users u ON u.id = r.user_id
             WHERE r.store_id = ?1 ORDER BY r.created_at DESC",
        )?;

        let ratings = stmt
            .query_map(params![store_id.to_string()], |row| {
                Ok(StoreRatingEntry {
                    rating: Self::row_to_rating(row)?,
                    user: RaterBrief { name: row.get(5)? },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ratings)
    }

    /// Average star value for a store; exactly 0 when it has no ratings
    pub fn average_rating(&self, store_id: &Uuid) -> Result<f64> {
        let conn = self.conn.lock();
        let avg: f64 = conn.query_row(
            "SELECT COALESCE(AVG(rating), 0.0) FROM ratings WHERE store_id = ?1",
            params![store_id.to_string()],
            |row| row.get(0),
        )?;

        Ok(avg)
    }

    fn row_to_rating(row: &Row) -> rusqlite::Result<Rating> {
        let id: String = row.get(0)?;
        let user_id: String = row.get(1)?;
        let store_id: String = row.get(2)?;
        Ok(Rating {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            user_id: Uuid::parse_str(&user_id).unwrap_or_default(),
            store_id: Uuid::parse_str(&store_id).unwrap_or_default(),
            value: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
