//! rostergrid - rebuilds a rows × columns grid from unordered bounding boxes.
//!
//! Feed detected rectangles into a [`Matrix`] with [`Matrix::auto_append`],
//! then call [`Matrix::sort`] and [`Matrix::prune`]. The result is a list of
//! rows ordered top to bottom, each holding labelled rectangles ordered left
//! to right, with missing cells inferred and unreliable rows removed.

pub mod column;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod params;
pub mod row;
pub mod segment;
pub mod stats;

pub use column::{Column, ColumnSet};
pub use error::{GridError, Result};
pub use geometry::{Rectangle, Span};
pub use matrix::{FilledRow, Matrix, Placement, PruneReport, RemovedRow};
pub use params::{BalanceParams, CollisionPolicy, CollisionRule, MatrixParams, PruneOptions};
pub use row::{AppendOutcome, CollisionOutcome, ItemOrigin, Row, RowItem};
pub use segment::{Cell, CellClassifier, LayoutExpectation, Segment};
pub use stats::GridStats;
