//! Runtime Configuration
//! Mission: Load all tunables from the environment with safe defaults

use tracing::warn;

const DEV_JWT_SECRET: &str = "ratehub-dev-secret-change-me";
const DEV_JWT_REFRESH_SECRET: &str = "ratehub-dev-refresh-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl_days: i64,
    pub cookie_secure: bool,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./ratehub.db".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("⚠️  JWT_SECRET not set - using development secret");
            DEV_JWT_SECRET.to_string()
        });

        let jwt_refresh_secret = std::env::var("JWT_REFRESH_SECRET").unwrap_or_else(|_| {
            warn!("⚠️  JWT_REFRESH_SECRET not set - using development secret");
            DEV_JWT_REFRESH_SECRET.to_string()
        });

        // Access tokens default to 7 days, refresh tokens to 30
        let access_token_ttl_hours = std::env::var("ACCESS_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse()
            .unwrap_or(168);

        let refresh_token_ttl_days = std::env::var("REFRESH_TOKEN_TTL_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);

        let admin_email =
            std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());

        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin@123".to_string());

        Ok(Self {
            bind_addr,
            database_path,
            jwt_secret,
            jwt_refresh_secret,
            access_token_ttl_hours,
            refresh_token_ttl_days,
            cookie_secure,
            admin_email,
            admin_password,
        })
    }
}
