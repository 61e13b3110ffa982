//! RateHub Backend Library
//!
//! Exposes core modules for use by the server binary and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
