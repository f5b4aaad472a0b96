//! Database access layer for hw-web
//!
//! Holds the pipeline's collaborators: the history store
//! ([`readings`]), the alert recorder ([`alerts`]), and the contact
//! directory ([`contacts`]), plus account/session/settings tables. All timestamps are stored as RFC3339 UTC TEXT so that
//! lexicographic SQL comparisons order chronologically.

use chrono::{DateTime, SecondsFormat, Utc};
use hw_common::{Error, Result};

pub mod alerts;
pub mod contacts;
pub mod readings;
pub mod sessions;
pub mod settings;
pub mod users;

/// Canonical TEXT representation for stored instants
pub(crate) fn to_db_time(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn from_db_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp '{}': {}", raw, e)))
}

pub(crate) fn parse_guid(raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw)
        .map_err(|e| Error::Internal(format!("Invalid stored guid '{}': {}", raw, e)))
}
