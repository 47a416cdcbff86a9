//! Error types for form construction, form reads and chart rendering.

use crate::model::FieldType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Field '{field}' has unsupported type {field_type:?}")]
    UnsupportedFieldType { field: String, field_type: FieldType },

    #[error("Error in field: {field}. Data not saved! ({message})")]
    FieldRead { field: String, message: String },
}

impl FormError {
    pub fn field(&self) -> &str {
        match self {
            FormError::UnsupportedFieldType { field, .. } | FormError::FieldRead { field, .. } => {
                field
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Per-series chart failures. None of these abort a whole chart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("series '{series}': maximum {axis} value is zero, cannot scale")]
    DivisionByZeroInScale { series: String, axis: Axis },

    #[error("series '{series}': no palette colour left, series not drawn")]
    UnassignedSeriesColor { series: String },

    #[error("series '{series}': field '{field}' is missing or not numeric")]
    NonNumericValue { series: String, field: String },
}
