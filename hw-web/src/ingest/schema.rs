//! Upload column schema
//!
//! Explicit mapping from recognized header names to reading fields,
//! replacing ad-hoc per-row header lookups. Header matching is
//! case-insensitive and column order is irrelevant.

/// Reading fields an upload column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Timestamp,
    Bpm,
    Label,
}

/// One recognized column: the target field, its accepted header
/// names, and whether an upload must provide it
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub field: Field,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

/// Ordered set of recognized upload columns
#[derive(Debug, Clone)]
pub struct UploadSchema {
    columns: Vec<ColumnSpec>,
}

/// Resolved positions of schema fields within one upload's header
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndexes {
    pub timestamp: usize,
    pub bpm: usize,
    pub label: Option<usize>,
}

impl Default for UploadSchema {
    /// Alias sets accepted by the upload endpoint:
    /// timestamp/ts/time/datetime + bpm/hr/heart_rate/heartrate,
    /// optional label
    fn default() -> Self {
        Self {
            columns: vec![
                ColumnSpec {
                    field: Field::Timestamp,
                    aliases: &["timestamp", "ts", "time", "datetime"],
                    required: true,
                },
                ColumnSpec {
                    field: Field::Bpm,
                    aliases: &["bpm", "hr", "heart_rate", "heartrate"],
                    required: true,
                },
                ColumnSpec {
                    field: Field::Label,
                    aliases: &["label"],
                    required: false,
                },
            ],
        }
    }
}

impl UploadSchema {
    /// Resolve a header row against the schema.
    ///
    /// Returns the column index of each field, or the first required
    /// field name that no header matched. The first matching header
    /// wins when a file repeats a column.
    pub fn resolve(&self, header: &[&str]) -> Result<ColumnIndexes, &'static str> {
        let normalized: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut timestamp = None;
        let mut bpm = None;
        let mut label = None;

        for spec in &self.columns {
            let found = normalized
                .iter()
                .position(|h| spec.aliases.contains(&h.as_str()));

            match (spec.field, found) {
                (Field::Timestamp, Some(i)) => timestamp = Some(i),
                (Field::Bpm, Some(i)) => bpm = Some(i),
                (Field::Label, Some(i)) => label = Some(i),
                (_, None) if spec.required => return Err(spec.aliases[0]),
                (_, None) => {}
            }
        }

        Ok(ColumnIndexes {
            timestamp: timestamp.ok_or("timestamp")?,
            bpm: bpm.ok_or("bpm")?,
            label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_canonical_header() {
        let schema = UploadSchema::default();
        let cols = schema.resolve(&["timestamp", "bpm", "label"]).unwrap();
        assert_eq!(cols.timestamp, 0);
        assert_eq!(cols.bpm, 1);
        assert_eq!(cols.label, Some(2));
    }

    #[test]
    fn matching_is_case_insensitive_and_order_free() {
        let schema = UploadSchema::default();
        let cols = schema.resolve(&["HR", " Datetime "]).unwrap();
        assert_eq!(cols.timestamp, 1);
        assert_eq!(cols.bpm, 0);
        assert_eq!(cols.label, None);
    }

    #[test]
    fn aliases_are_accepted() {
        let schema = UploadSchema::default();
        let cols = schema.resolve(&["ts", "heart_rate"]).unwrap();
        assert_eq!(cols.timestamp, 0);
        assert_eq!(cols.bpm, 1);
    }

    #[test]
    fn missing_required_column_reports_field_name() {
        let schema = UploadSchema::default();
        let missing = schema.resolve(&["timestamp", "label"]).unwrap_err();
        assert_eq!(missing, "bpm");

        let missing = schema.resolve(&["bpm"]).unwrap_err();
        assert_eq!(missing, "timestamp");
    }
}
