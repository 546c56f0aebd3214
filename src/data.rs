use std::collections::HashMap;

use compact_str::CompactString;

use crate::error::ChartError;
use crate::render::colors::ChartColor;

/// Opaque host token identifying a source data row for cross-filtering.
/// The core never inspects it beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowIdentity(pub u64);

/// One already-grouped row from the host data layer. `keys` holds the
/// categorical value for each grouping column present on the row; a row
/// missing a column is excluded from that partition level, never coerced.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub keys: HashMap<CompactString, CompactString>,
    /// Numeric measure; `None` mirrors a null cell and drops the row.
    pub measure: Option<f64>,
    pub identity: RowIdentity,
}

impl SourceRow {
    pub fn new(identity: RowIdentity, measure: f64) -> Self {
        Self {
            keys: HashMap::new(),
            measure: Some(measure),
            identity,
        }
    }

    pub fn with_key(mut self, field: &str, value: &str) -> Self {
        self.keys
            .insert(CompactString::new(field), CompactString::new(value));
        self
    }
}

/// The host data contract: an ordered grouping sequence (series group field
/// first, then subcategories) plus flat rows and optional per-group styling.
#[derive(Debug, Clone, Default)]
pub struct DataView {
    pub group_field: String,
    pub category_fields: Vec<String>,
    pub rows: Vec<SourceRow>,
    /// Host-supplied color overrides keyed by top-level group name.
    pub group_colors: HashMap<CompactString, ChartColor>,
    /// Display name of the measure column, used for tooltips.
    pub measure_name: String,
}

impl DataView {
    /// Grouping-key sequence in partition order.
    pub fn key_sequence(&self) -> Vec<&str> {
        let mut seq = Vec::with_capacity(self.category_fields.len() + 1);
        seq.push(self.group_field.as_str());
        for field in &self.category_fields {
            seq.push(field.as_str());
        }
        seq
    }

    /// Role validation performed before any tree building.
    pub fn validate(&self) -> Result<(), ChartError> {
        if self
            .category_fields
            .iter()
            .any(|field| *field == self.group_field)
        {
            return Err(ChartError::DuplicateRole);
        }
        if self.category_fields.is_empty() {
            return Err(ChartError::MissingCategory);
        }
        if !self.rows.is_empty() && self.rows.iter().all(|row| row.measure.is_none()) {
            return Err(ChartError::MissingMeasure);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_role_is_rejected() {
        let view = DataView {
            group_field: "Region".into(),
            category_fields: vec!["Region".into()],
            ..Default::default()
        };
        assert!(matches!(view.validate(), Err(ChartError::DuplicateRole)));
    }

    #[test]
    fn missing_category_field_is_rejected() {
        let view = DataView {
            group_field: "Region".into(),
            ..Default::default()
        };
        assert!(matches!(view.validate(), Err(ChartError::MissingCategory)));
    }

    #[test]
    fn all_null_measures_are_rejected() {
        let mut row = SourceRow::new(RowIdentity(1), 0.0);
        row.measure = None;
        let view = DataView {
            group_field: "Region".into(),
            category_fields: vec!["Sub".into()],
            rows: vec![row],
            ..Default::default()
        };
        assert!(matches!(view.validate(), Err(ChartError::MissingMeasure)));
    }

    #[test]
    fn empty_rows_are_not_an_error() {
        let view = DataView {
            group_field: "Region".into(),
            category_fields: vec!["Sub".into()],
            ..Default::default()
        };
        assert!(view.validate().is_ok());
    }
}
