//! HTTP API handlers

pub mod alerts;
pub mod auth;
pub mod contacts;
pub mod health;
pub mod readings;
pub mod settings;
pub mod upload;

pub use auth::CurrentUser;
pub use health::health_routes;
