//! Store Storage
//! Mission: Store persistence with owner joins and rating aggregates

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use super::{Database, SortOrder};
use crate::models::{OwnerBrief, Store, StoreCounts, StoreDetail, StoreSummary};

/// Filters and paging for the public store listing
#[derive(Debug, Clone)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub address: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

/// Whitelist of sortable columns; unknown keys fall back to creation time
fn store_sort_column(key: Option<&str>) -> &'static str {
    match key {
        Some("name") => "name",
        Some("email") => "email",
        Some("address") => "address",
        _ => "created_at",
    }
}

impl Database {
    pub fn create_store(
        &self,
        name: &str,
        email: Option<&str>,
        address: Option<&str>,
        owner_id: &Uuid,
    ) -> Result<Store> {
        let store = Store {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.map(|e| e.to_string()),
            address: address.map(|a| a.to_string()),
            owner_id: *owner_id,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO stores (id, name, email, address, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                store.id.to_string(),
                store.name,
                store.email,
                store.address,
                store.owner_id.to_string(),
                store.created_at,
            ],
        )?;

        Ok(store)
    }

    pub fn store_exists(&self, id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT 1 FROM stores WHERE id = ?1")?;

        let found = stmt
            .query_row(params![id.to_string()], |_| Ok(()))
            .optional()?;

        Ok(found.is_some())
    }

    /// Filtered, paginated listing with owner contact and rating aggregates
    pub fn list_stores(&self, filter: &StoreFilter) -> Result<(Vec<StoreSummary>, i64)> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(name) = &filter.name {
            clauses.push("s.name LIKE '%' || ? || '%'");
            args.push(name.clone());
        }
        if let Some(address) = &filter.address {
            clauses.push("s.address LIKE '%' || ? || '%'");
            args.push(address.clone());
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let conn = self.conn.lock();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM stores s{}", where_sql),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let offset = (filter.page.saturating_sub(1) as i64) * filter.limit as i64;
        let sql = format!(
            "SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
                    u.name AS owner_name, u.email AS owner_email,
                    (SELECT COUNT(*) FROM ratings r WHERE r.store_id = s.id) AS rating_count,
                    COALESCE((SELECT AVG(r.rating) FROM ratings r WHERE r.store_id = s.id), 0.0)
                        AS average_rating
             FROM stores s
             JOIN users u ON u.id = s.owner_id{} ORDER BY s.{} {} LIMIT {} OFFSET {}",
            where_sql,
            store_sort_column(filter.sort_by.as_deref()),
            filter.sort_order.as_sql(),
            filter.limit,
            offset
        );

        let mut stmt = conn.prepare(&sql)?;
        let stores = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(StoreSummary {
                    store: Self::row_to_store(row)?,
                    owner: OwnerBrief {
                        name: row.get(6)?,
                        email: row.get(7)?,
                    },
                    counts: StoreCounts {
                        ratings: row.get(8)?,
                    },
                    average_rating: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((stores, total))
    }

    /// Full store view with owner contact, ratings, and average
    pub fn store_detail(&self, id: &Uuid) -> Result<Option<StoreDetail>> {
        let Some((store, owner)) = self.store_with_owner(id)? else {
            return Ok(None);
        };

        let ratings = self.ratings_for_store(id)?;
        let average_rating = self.average_rating(id)?;

        Ok(Some(StoreDetail {
            store,
            owner: Some(owner),
            ratings,
            average_rating,
        }))
    }

    /// Stores owned by one user, as bare records
    pub fn stores_owned_by(&self, owner_id: &Uuid) -> Result<Vec<Store>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, address, owner_id, created_at
             FROM stores WHERE owner_id = ?1 ORDER BY created_at DESC",
        )?;

        let stores = stmt
            .query_map(params![owner_id.to_string()], |row| Self::row_to_store(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(stores)
    }

    /// Owner dashboard view: every owned store with its ratings and average
    pub fn owned_store_details(&self, owner_id: &Uuid) -> Result<Vec<StoreDetail>> {
        let stores = self.stores_owned_by(owner_id)?;

        let mut details = Vec::with_capacity(stores.len());
        for store in stores {
            let ratings = self.ratings_for_store(&store.id)?;
            let average_rating = self.average_rating(&store.id)?;
            details.push(StoreDetail {
                store,
                owner: None,
                ratings,
                average_rating,
            });
        }

        Ok(details)
    }

    fn store_with_owner(&self, id: &Uuid) -> Result<Option<(Store, OwnerBrief)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
                    u.name, u.email
             FROM stores s
             JOIN users u ON u.id = s.owner_id
             WHERE s.id = ?1",
        )?;

        let found = stmt
            .query_row(params![id.to_string()], |row| {
                Ok((
                    Self::row_to_store(row)?,
                    OwnerBrief {
                        name: row.get(6)?,
                        email: row.get(7)?,
                    },
                ))
            })
            .optional()?;

        Ok(found)
    }

    fn row_to_store(row: &Row) -> rusqlite::Result<Store> {
        let id: String = row.get(0)?;
        let owner_id: String = row.get(4)?;
        Ok(Store {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            name: row.get(1)?,
            email: row.get(2)?,
            address: row.get(3)?,
            owner_id: Uuid::parse_str(&owner_id).unwrap_or_default(),
            created_at: row.get(5)?,
        })
    }
}
