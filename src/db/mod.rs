//! SQLite Storage Layer
//! Mission: Durable storage for users, stores, and ratings
//!
//! Key properties:
//! - WAL mode for concurrent reads during writes
//! - Prepared statement caching on hot lookups
//! - Uniqueness (one account per email, one rating per user per store)
//!   enforced by the schema, not by check-then-act application code

use anyhow::{Context, Result};
use parking_lot::Mutex; // Faster than std::sync::Mutex
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::models::{DashboardStats, Role};

mod ratings;
mod stores;
mod users;

pub use stores::StoreFilter;
pub use users::UserFilter;

const SCHEMA_SQL: &str = r#"
-- Enable WAL mode for better concurrent access
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'USER',
    address TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS stores (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    address TEXT,
    owner_id TEXT NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ratings (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    store_id TEXT NOT NULL REFERENCES stores(id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    created_at TEXT NOT NULL,
    UNIQUE (user_id, store_id)
);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

CREATE INDEX IF NOT EXISTS idx_stores_owner ON stores(owner_id);

CREATE INDEX IF NOT EXISTS idx_ratings_store
    ON ratings(store_id, created_at DESC);

CREATE INDEX IF NOT EXISTS idx_ratings_user
    ON ratings(user_id, created_at DESC);
"#;

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a `sortOrder` query value; anything but "asc" means descending
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Shared storage handle, cloned into every request handler
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path))?;
        let db = Self::from_connection(conn)?;

        // Verify WAL mode is active
        let journal_mode: String = db
            .conn
            .lock()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();

        if journal_mode.to_lowercase() != "wal" {
            warn!("WAL mode not active, journal_mode = {}", journal_mode);
        }

        info!("📊 Database initialized at: {}", path);

        Ok(db)
    }

    /// In-memory database for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the bootstrap admin account if no admin exists yet
    pub fn ensure_default_admin(&self, email: &str, password: &str) -> Result<()> {
        let admin_count: i64 = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'ADMIN'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?
        };

        if admin_count > 0 {
            return Ok(());
        }

        let password_hash = hash_password(password)?;
        self.create_user("System Administrator", email, &password_hash, Role::Admin, None)
            .context("Failed to insert admin user")?;

        info!("🔐 Default admin user created (email: {})", email);
        warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");

        Ok(())
    }

    /// Platform totals for the admin dashboard
    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        let conn = self.conn.lock();

        let total_users: i64 =
            conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let total_stores: i64 =
            conn.query_row("SELECT COUNT(*) FROM stores", [], |row| row.get(0))?;
        let total_ratings: i64 =
            conn.query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))?;

        let mut stmt = conn.prepare_cached(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )?;
        let user_role_distribution = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(DashboardStats {
            total_users,
            total_stores,
            total_ratings,
            user_role_distribution,
        })
    }
}
