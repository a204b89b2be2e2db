//! The matrix: an ordered list of rows plus the columns derived from them.
//!
//! Rectangles are routed into rows one at a time by [`Matrix::auto_append`].
//! Once everything is ingested, [`Matrix::sort`] orders the grid and
//! [`Matrix::prune`] balances it, fills missing cells and drops rows that
//! are too short to be trusted.

mod balance;
mod prune;

use std::fmt;
use std::ops::Index;

use tracing::debug;

use crate::column::ColumnSet;
use crate::error::Result;
use crate::geometry::Rectangle;
use crate::params::MatrixParams;
use crate::row::{AppendOutcome, Row};
use crate::segment::Segment;
use crate::stats::{self, GridStats};

pub use prune::{FilledRow, PruneReport, RemovedRow};

/// Where [`Matrix::auto_append`] placed a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the receiving row in the current row list.
    pub row: usize,
    pub outcome: AppendOutcome,
    /// The rectangle started a new row.
    pub new_row: bool,
}

/// A grid of rows reconstructed from detected rectangles.
#[derive(Debug, Clone)]
pub struct Matrix {
    source_height: f64,
    source_width: f64,
    params: MatrixParams,
    rows: Vec<Row>,
    /// Creation sequence number of each entry in `rows`.
    created: Vec<usize>,
    next_seq: usize,
    columns: ColumnSet,
}

impl Matrix {
    /// Creates an empty matrix for an image of the given size.
    pub fn new(source_height: f64, source_width: f64) -> Self {
        Self::with_params(source_height, source_width, MatrixParams::default())
    }

    pub fn with_params(source_height: f64, source_width: f64, params: MatrixParams) -> Self {
        Self {
            source_height,
            source_width,
            params,
            rows: Vec::new(),
            created: Vec::new(),
            next_seq: 0,
            columns: ColumnSet::new(),
        }
    }

    pub fn source_height(&self) -> f64 {
        self.source_height
    }

    pub fn source_width(&self) -> f64 {
        self.source_width
    }

    pub fn params(&self) -> &MatrixParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Columns as of the last balancing pass.
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Rebuilds the columns from the current items without balancing them.
    pub fn refresh_columns(&mut self) -> &ColumnSet {
        self.columns = ColumnSet::derive(&self.rows);
        &self.columns
    }

    pub fn row_lengths(&self) -> Vec<usize> {
        self.rows.iter().map(Row::len).collect()
    }

    pub fn item_count(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }

    /// Mean of the per-row average item widths.
    pub fn average_width(&self) -> Result<f64> {
        stats::average_width(&self.rows)
    }

    /// Mean of the per-row average item heights.
    pub fn average_height(&self) -> Result<f64> {
        stats::average_height(&self.rows)
    }

    /// Mean of the per-row item gaps, `None` when undefined or zero.
    pub fn average_gap(&self) -> Option<f64> {
        stats::average_gap(&self.rows)
    }

    pub fn stats(&self) -> Result<GridStats> {
        GridStats::from_rows(&self.rows)
    }

    /// Adds a rectangle to the first row it overlaps enough, or starts a row.
    ///
    /// Rows are tried in the order they were created. For a row with anchor
    /// `head` and average item height `h`, the rectangle's bottom edge is
    /// compared with `head + h`; the row accepts when
    /// `1 - |head + h - bottom| / h` exceeds `spacing_percent`. The first
    /// accepting row wins even when a later row would match better.
    pub fn auto_append(
        &mut self,
        rectangle: Rectangle,
        label: impl Into<String>,
        detect_collision: bool,
    ) -> Result<Placement> {
        let collision = detect_collision.then_some(self.params.collision);
        let object_end = rectangle.y2();

        let target = self.creation_order().into_iter().find(|&idx| {
            let row = &self.rows[idx];
            match (row.head(), row.average_height()) {
                (Some(head), Some(avg_h)) => {
                    let row_end = head + avg_h;
                    let overlap = 1.0 - (row_end - object_end).abs() / avg_h;
                    overlap > self.params.spacing_percent
                }
                _ => false,
            }
        });

        if let Some(idx) = target {
            let outcome = self.rows[idx].append(rectangle, label, collision)?;
            return Ok(Placement {
                row: idx,
                outcome,
                new_row: false,
            });
        }

        let mut row = Row::new();
        let outcome = row.append(rectangle, label, collision)?;
        let idx = self.rows.len();
        debug!(row = idx, head = rectangle.y(), "starting new row");
        self.rows.push(row);
        self.created.push(self.next_seq);
        self.next_seq += 1;
        Ok(Placement {
            row: idx,
            outcome,
            new_row: true,
        })
    }

    /// Feeds segments through [`Matrix::auto_append`] in order, with
    /// collision detection on.
    pub fn extend_segments<I>(&mut self, segments: I) -> Result<Vec<Placement>>
    where
        I: IntoIterator<Item = Segment>,
    {
        segments
            .into_iter()
            .map(|segment| self.auto_append(segment.rectangle, segment.label, true))
            .collect()
    }

    /// Sorts every row left to right, then the rows top to bottom by head.
    pub fn sort(&mut self) {
        for row in &mut self.rows {
            row.sort();
        }
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| {
            let ha = self.rows[a].head().unwrap_or(f64::INFINITY);
            let hb = self.rows[b].head().unwrap_or(f64::INFINITY);
            ha.total_cmp(&hb)
        });
        self.apply_order(&order);
    }

    /// Row indices ordered by creation.
    fn creation_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by_key(|&idx| self.created[idx]);
        order
    }

    fn apply_order(&mut self, order: &[usize]) {
        let mut rows: Vec<Option<Row>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(Some)
            .collect();
        let created = std::mem::take(&mut self.created);
        for &idx in order {
            if let Some(row) = rows[idx].take() {
                self.rows.push(row);
                self.created.push(created[idx]);
            }
        }
    }

    fn remove_row(&mut self, index: usize) -> Row {
        self.created.remove(index);
        self.rows.remove(index)
    }
}

impl Index<usize> for Matrix {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl<'a> IntoIterator for &'a Matrix {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, row) in self.rows.iter().enumerate() {
            if n > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{row}")?;
        }
        Ok(())
    }
}
