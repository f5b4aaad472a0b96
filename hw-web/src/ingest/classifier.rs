//! Rule-based abnormality classifier
//!
//! Pure and total: every bpm value maps to exactly one tag, with no
//! side effects. Out-of-range bpm values never reach this point (the
//! parser rejects them), but classification is defined for them anyway.

use hw_common::db::models::Tag;
use hw_common::db::{DEFAULT_ELEVATED_BPM, DEFAULT_HIGH_BPM, DEFAULT_LOW_BPM};
use serde::{Deserialize, Serialize};

/// Classifier threshold configuration.
///
/// Persisted in the settings table (`classify_low_bpm`,
/// `classify_elevated_bpm`, `classify_high_bpm`); these are the
/// defaults used on first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this: critical (bradycardia band)
    pub low_bpm: i64,
    /// At or above this (and not above high): abnormal
    pub elevated_bpm: i64,
    /// Above this: critical
    pub high_bpm: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_bpm: DEFAULT_LOW_BPM,
            elevated_bpm: DEFAULT_ELEVATED_BPM,
            high_bpm: DEFAULT_HIGH_BPM,
        }
    }
}

impl Thresholds {
    /// Validate ordering: 0 < low < elevated <= high
    pub fn validate(&self) -> Result<(), String> {
        if self.low_bpm <= 0 {
            return Err("low_bpm must be positive".to_string());
        }
        if self.low_bpm >= self.elevated_bpm {
            return Err("low_bpm must be below elevated_bpm".to_string());
        }
        if self.elevated_bpm > self.high_bpm {
            return Err("elevated_bpm must not exceed high_bpm".to_string());
        }
        Ok(())
    }
}

/// Classify one heart-rate value.
///
/// An explicit label in {0, 1, 2} overrides the rule-based check
/// (labels from the source dataset take precedence for demo
/// reproducibility): 0 → normal, 1 → abnormal, 2 → critical. Any
/// other label value falls through to the rules:
/// - bpm below `low_bpm` or above `high_bpm` → critical
/// - bpm at or above `elevated_bpm` → abnormal
/// - otherwise → normal
pub fn classify(bpm: i64, explicit_label: Option<i64>, thresholds: &Thresholds) -> Tag {
    match explicit_label {
        Some(0) => return Tag::Normal,
        Some(1) => return Tag::Abnormal,
        Some(2) => return Tag::Critical,
        _ => {}
    }

    if bpm < thresholds.low_bpm || bpm > thresholds.high_bpm {
        Tag::Critical
    } else if bpm >= thresholds.elevated_bpm {
        Tag::Abnormal
    } else {
        Tag::Normal
    }
}
