//! Error types for the rostergrid reconstruction engine.

use thiserror::Error;

/// Primary error type for grid reconstruction operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid rectangle ({x}, {y}, {width}x{height}): width and height must be positive")]
    InvalidRectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    /// A statistic needed for balancing or gap-fill has no usable value.
    #[error("degenerate geometry: {0} is undefined or zero")]
    DegenerateGeometry(&'static str),

    /// The rectangle lies in no known column; the column set is stale.
    #[error("no column contains span [{x}, {x2}]")]
    ColumnNotFound { x: f64, x2: f64 },

    #[error("label already present in row: {0}")]
    DuplicateLabel(String),

    #[error(
        "layout mismatch: expected {expected_rows} rows of {expected_columns}, got row lengths {actual:?}"
    )]
    LayoutMismatch {
        expected_rows: usize,
        expected_columns: usize,
        actual: Vec<usize>,
    },
}

/// Convenience Result type alias for GridError.
pub type Result<T> = std::result::Result<T, GridError>;
