//! HTTP Middleware
//! Mission: Request observability around the router

pub mod logging;

pub use logging::request_logging;
