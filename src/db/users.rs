//! User Storage
//! Mission: Account persistence with filtered, paginated listing

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use super::{Database, SortOrder};
use crate::models::{PublicUser, Role, User, UserCounts, UserDetail, UserWithCounts};

/// Filters and paging for the admin user listing
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

/// Whitelist of sortable columns; unknown keys fall back to creation time
fn user_sort_column(key: Option<&str>) -> &'static str {
    match key {
        Some("name") => "name",
        Some("email") => "email",
        Some("role") => "role",
        _ => "created_at",
    }
}

impl Database {
    /// Insert a new account. Callers downcast the error to detect a
    /// duplicate email (UNIQUE violation).
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        address: Option<&str>,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            address: address.map(|a| a.to_string()),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role, address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.address,
                user.created_at,
            ],
        )?;

        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, password_hash, role, address, created_at
             FROM users WHERE email = ?1",
        )?;

        let user = stmt
            .query_row(params![email], |row| Self::row_to_user(row))
            .optional()?;

        Ok(user)
    }

    pub fn find_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, password_hash, role, address, created_at
             FROM users WHERE id = ?1",
        )?;

        let user = stmt
            .query_row(params![id.to_string()], |row| Self::row_to_user(row))
            .optional()?;

        Ok(user)
    }

    /// Atomically replace a user's credential hash
    pub fn update_password_hash(&self, id: &Uuid, password_hash: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id.to_string()],
        )?;

        Ok(rows > 0)
    }

    /// Filtered, paginated listing with per-user relation counts
    pub fn list_users(&self, filter: &UserFilter) -> Result<(Vec<UserWithCounts>, i64)> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(name) = &filter.name {
            clauses.push("u.name LIKE '%' || ? || '%'");
            args.push(name.clone());
        }
        if let Some(email) = &filter.email {
            clauses.push("u.email LIKE '%' || ? || '%'");
            args.push(email.clone());
        }
        if let Some(role) = filter.role {
            clauses.push("u.role = ?");
            args.push(role.as_str().to_string());
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let conn = self.conn.lock();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM users u{}", where_sql),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let offset = (filter.page.saturating_sub(1) as i64) * filter.limit as i64;
        let sql = format!(
            "SELECT u.id, u.name, u.email, u.role, u.address, u.created_at,
                    (SELECT COUNT(*) FROM stores s WHERE s.owner_id = u.id) AS store_count,
                    (SELECT COUNT(*) FROM ratings r WHERE r.user_id = u.id) AS rating_count
             FROM users u{} ORDER BY u.{} {} LIMIT {} OFFSET {}",
            where_sql,
            user_sort_column(filter.sort_by.as_deref()),
            filter.sort_order.as_sql(),
            filter.limit,
            offset
        );

        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                let id: String = row.get(0)?;
                let role: String = row.get(3)?;
                Ok(UserWithCounts {
                    user: PublicUser {
                        id: Uuid::parse_str(&id).unwrap_or_default(),
                        name: row.get(1)?,
                        email: row.get(2)?,
                        role: Role::from_str(&role).unwrap_or(Role::User),
                        address: row.get(4)?,
                        created_at: row.get(5)?,
                    },
                    counts: UserCounts {
                        stores: row.get(6)?,
                        ratings: row.get(7)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, total))
    }

    /// Full user view with owned stores and submitted ratings
    pub fn user_detail(&self, id: &Uuid) -> Result<Option<UserDetail>> {
        let Some(user) = self.find_user_by_id(id)? else {
            return Ok(None);
        };

        let stores = self.stores_owned_by(id)?;
        let ratings = self.ratings_for_user(id)?;

        Ok(Some(UserDetail {
            user: PublicUser::from_user(&user),
            stores,
            ratings,
        }))
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        let id: String = row.get(0)?;
        let role: String = row.get(4)?;
        Ok(User {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            role: Role::from_str(&role).unwrap_or(Role::User),
            address: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
