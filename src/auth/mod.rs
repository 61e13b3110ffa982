//! Authentication Module
//! Mission: Secure API access with JWT tokens, bcrypt credentials, and RBAC

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::TokenService;
pub use middleware::{authenticate, require_admin, require_store_owner, TOKEN_COOKIE};
pub use models::CurrentUser;
