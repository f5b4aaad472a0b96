//! # HeartWatch Common Library
//!
//! Shared code for the HeartWatch demo application:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Database initialization, schema, and row models
//! - Credential and session-token helpers

pub mod auth;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
