//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification outcome for one heart-rate reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Normal,
    Abnormal,
    Critical,
}

impl Tag {
    /// TEXT column value
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Normal => "normal",
            Tag::Abnormal => "abnormal",
            Tag::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tag {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Tag::Normal),
            "abnormal" => Ok(Tag::Abnormal),
            "critical" => Ok(Tag::Critical),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown classification tag: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_guid: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One stored heart-rate sample with its classification tag.
///
/// Readings are append-only: immutable once stored, never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReading {
    pub guid: Uuid,
    pub user_guid: Uuid,
    pub ts: DateTime<Utc>,
    pub bpm: i64,
    /// Optional label carried from the source dataset (0/1/2)
    pub label: Option<i64>,
    pub tag: Tag,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub guid: Uuid,
    pub user_guid: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time copy of a contact stored inside an alert record.
///
/// Snapshotted at alert time so later contact edits do not rewrite
/// the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<&EmergencyContact> for ContactSnapshot {
    fn from(c: &EmergencyContact) -> Self {
        Self {
            name: c.name.clone(),
            phone: c.phone.clone(),
            email: c.email.clone(),
        }
    }
}

/// Audit entry created when a reading classifies as critical,
/// or on an explicit user-triggered simulated alert. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub guid: Uuid,
    pub user_guid: Uuid,
    pub reading_guid: Uuid,
    pub location: Option<String>,
    pub recipients: Vec<ContactSnapshot>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tag_text_round_trip() {
        for tag in [Tag::Normal, Tag::Abnormal, Tag::Critical] {
            assert_eq!(Tag::from_str(tag.as_str()).unwrap(), tag);
        }
        assert!(Tag::from_str("elevated").is_err());
    }
}
