//! Reading parser
//!
//! Turns raw uploaded tabular text into a lazy sequence of per-row
//! outcomes. A malformed row is reported and skipped; only a missing
//! or incomplete header aborts the whole upload.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use super::schema::{ColumnIndexes, UploadSchema};

/// Sane upper bound for an accepted bpm value (exclusive)
pub const BPM_MAX: i64 = 300;

/// Whole-upload failure: nothing could be ingested
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("upload is empty")]
    Empty,

    #[error("missing required column: {0} (header names are case-insensitive)")]
    MissingColumn(&'static str),
}

/// One candidate reading parsed from an upload row, not yet classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReading {
    pub ts: DateTime<Utc>,
    pub bpm: i64,
    pub label: Option<i64>,
}

/// Why a single row was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowErrorReason {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("bpm is not numeric: {0}")]
    InvalidBpm(String),

    #[error("bpm out of accepted range (1..{}): {0}", BPM_MAX - 1)]
    BpmOutOfRange(i64),

    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),
}

/// A rejected row: recovered, counted, never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row index (header excluded)
    pub row_index: usize,
    pub reason: RowErrorReason,
}

/// Parse upload text against a schema.
///
/// The header row is mandatory. On success, returns a single-pass
/// iterator over the data rows; the iterator is finite and not
/// restartable.
pub fn parse_upload<'a>(
    text: &'a str,
    schema: &UploadSchema,
) -> Result<RowIter<'a>, FormatError> {
    let mut lines = text.lines();

    let header_line = loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => break line,
            None => return Err(FormatError::Empty),
        }
    };

    let header: Vec<&str> = split_row(header_line);
    let columns = schema
        .resolve(&header)
        .map_err(FormatError::MissingColumn)?;

    Ok(RowIter {
        lines,
        columns,
        row_index: 0,
    })
}

/// Lazy per-row iterator over upload data rows
pub struct RowIter<'a> {
    lines: std::str::Lines<'a>,
    columns: ColumnIndexes,
    row_index: usize,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = Result<CandidateReading, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            if line.trim().is_empty() {
                continue;
            }
            self.row_index += 1;
            return Some(parse_row(line, &self.columns, self.row_index));
        }
    }
}

fn parse_row(
    line: &str,
    columns: &ColumnIndexes,
    row_index: usize,
) -> Result<CandidateReading, RowError> {
    let fields = split_row(line);

    let reject = |reason| Err(RowError { row_index, reason });

    let Some(ts_raw) = field(&fields, columns.timestamp) else {
        return reject(RowErrorReason::MissingValue("timestamp"));
    };
    let Some(bpm_raw) = field(&fields, columns.bpm) else {
        return reject(RowErrorReason::MissingValue("bpm"));
    };

    let Some(ts) = parse_timestamp(ts_raw) else {
        return reject(RowErrorReason::InvalidTimestamp(ts_raw.to_string()));
    };

    let Some(bpm) = parse_integer(bpm_raw) else {
        return reject(RowErrorReason::InvalidBpm(bpm_raw.to_string()));
    };
    if bpm <= 0 || bpm >= BPM_MAX {
        return reject(RowErrorReason::BpmOutOfRange(bpm));
    }

    // A non-integer label is treated as absent, not as a bad row
    let label = columns
        .label
        .and_then(|i| field(&fields, i))
        .and_then(parse_integer);

    Ok(CandidateReading { ts, bpm, label })
}

/// Non-empty trimmed field at `index`, if present
fn field<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields.get(index).copied().filter(|v| !v.is_empty())
}

fn split_row(line: &str) -> Vec<&str> {
    line.split(',').map(|f| f.trim()).collect()
}

/// Accepted timestamp formats: RFC3339, `%Y-%m-%dT%H:%M:%S`, and
/// `%Y-%m-%d %H:%M:%S` (naive values are taken as UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Integer parse with float fallback: `72.0` is accepted as 72
fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64)
}
