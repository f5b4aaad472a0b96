//! Ingestion coordinator
//!
//! Orchestrates parse → classify → persist for one upload and
//! produces the summary returned to the caller. Holds no shared
//! mutable state: the pool handle, thresholds, and owning user are
//! passed in explicitly.

use hw_common::db::models::{ContactSnapshot, Tag};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::classifier::{classify, Thresholds};
use super::parser::{parse_upload, FormatError};
use super::schema::UploadSchema;
use crate::db::readings::AppendOutcome;
use crate::db::{alerts, contacts, readings};

/// Whole-upload failure. Per-row problems never surface here; only
/// input that cannot be ingested at all aborts the call.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Upload is not tabular text with the required header
    #[error("unreadable upload: {0}")]
    Format(#[from] FormatError),

    /// Upload bytes are not valid UTF-8
    #[error("upload is not valid UTF-8 text")]
    Encoding,

    /// Storage-layer failure while appending
    #[error(transparent)]
    Storage(#[from] hw_common::Error),
}

/// Accepted readings per classification tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub normal: usize,
    pub abnormal: usize,
    pub critical: usize,
}

impl TagCounts {
    fn bump(&mut self, tag: Tag) {
        match tag {
            Tag::Normal => self.normal += 1,
            Tag::Abnormal => self.abnormal += 1,
            Tag::Critical => self.critical += 1,
        }
    }
}

/// Outcome report for one upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    /// Data rows seen (header excluded)
    pub total_rows: usize,
    /// Rows that parsed and validated
    pub accepted: usize,
    /// Rows rejected with a row error
    pub rejected: usize,
    /// Accepted rows whose (ts, bpm) was already in history; not
    /// re-appended and no repeat alert
    pub duplicates: usize,
    pub counts_by_tag: TagCounts,
    /// Alert records created for critical readings
    pub alert_count: usize,
}

/// Ingest one upload for a user.
///
/// Every accepted reading is classified and appended to the user's
/// history; newly appended critical readings additionally produce an
/// alert record carrying a snapshot of the user's current contact
/// list. Returns a summary even when every row was rejected — only
/// totally unreadable input fails the call.
pub async fn ingest(
    db: &SqlitePool,
    thresholds: &Thresholds,
    user_guid: Uuid,
    raw: &[u8],
) -> Result<UploadSummary, IngestError> {
    let text = std::str::from_utf8(raw).map_err(|_| IngestError::Encoding)?;

    let schema = UploadSchema::default();
    let rows = parse_upload(text, &schema)?;

    let mut summary = UploadSummary::default();
    // Contact snapshot is taken once per upload, on the first alert
    let mut snapshot: Option<Vec<ContactSnapshot>> = None;

    for outcome in rows {
        summary.total_rows += 1;

        let candidate = match outcome {
            Ok(candidate) => candidate,
            Err(row_error) => {
                summary.rejected += 1;
                debug!(
                    row = row_error.row_index,
                    reason = %row_error.reason,
                    "Rejected upload row"
                );
                continue;
            }
        };

        summary.accepted += 1;
        let tag = classify(candidate.bpm, candidate.label, thresholds);
        summary.counts_by_tag.bump(tag);

        match readings::append(db, user_guid, &candidate, tag).await? {
            AppendOutcome::Duplicate => {
                summary.duplicates += 1;
            }
            AppendOutcome::Inserted(reading_guid) => {
                if tag == Tag::Critical {
                    if snapshot.is_none() {
                        let loaded: Vec<ContactSnapshot> = contacts::list(db, user_guid)
                            .await?
                            .iter()
                            .map(ContactSnapshot::from)
                            .collect();
                        snapshot = Some(loaded);
                    }
                    let recipients = snapshot.as_deref().unwrap_or(&[]);
                    alerts::record(db, user_guid, reading_guid, None, recipients).await?;
                    summary.alert_count += 1;
                }
            }
        }
    }

    info!(
        user = %user_guid,
        total = summary.total_rows,
        accepted = summary.accepted,
        rejected = summary.rejected,
        duplicates = summary.duplicates,
        alerts = summary.alert_count,
        "Upload ingested"
    );

    Ok(summary)
}
