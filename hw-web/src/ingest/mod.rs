//! Heart-rate ingestion pipeline
//!
//! parse → classify → persist for one upload:
//! - [`schema`]: recognized upload columns and header resolution
//! - [`parser`]: raw tabular text to per-row outcomes
//! - [`classifier`]: pure bpm → tag mapping
//! - [`coordinator`]: orchestration and upload summary

pub mod classifier;
pub mod coordinator;
pub mod parser;
pub mod schema;

pub use classifier::{classify, Thresholds};
pub use coordinator::{ingest, IngestError, TagCounts, UploadSummary};
pub use parser::{parse_upload, CandidateReading, FormatError, RowError, RowErrorReason};
pub use schema::UploadSchema;
