use thiserror::Error;

/// Failures surfaced by the chart core. Configuration and missing-data
/// variants carry the inline message the host shows in place of the chart;
/// render failures are logged and leave the previous frame on screen.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Same values field cannot be inserted in Category and Subcategory fields")]
    DuplicateRole,

    #[error("Insert Values in Mandatory SubCategory Field")]
    MissingCategory,

    #[error("Insert Values in Mandatory Measure Field")]
    MissingMeasure,

    #[error("render failed: {0}")]
    Render(String),
}

impl ChartError {
    /// Whether the host should replace the chart with the error text
    /// (configuration problems) or keep the last good frame (render faults).
    pub fn is_inline_message(&self) -> bool {
        !matches!(self, ChartError::Render(_))
    }
}
