//! Seams to the stages around reconstruction.
//!
//! Segmentation hands the matrix [`Segment`]s; after `sort` and `prune` a
//! labelling stage walks the grid through a [`CellClassifier`], and callers
//! that know the screen layout check the result with a
//! [`LayoutExpectation`].

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::geometry::Rectangle;
use crate::matrix::Matrix;
use crate::row::RowItem;

/// One detected object: a rectangle and the label segmentation gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(flatten)]
    pub rectangle: Rectangle,
    pub label: String,
}

impl Segment {
    pub fn new(x: f64, y: f64, width: f64, height: f64, label: impl Into<String>) -> Result<Self> {
        Ok(Self {
            rectangle: Rectangle::new(x, y, width, height)?,
            label: label.into(),
        })
    }
}

/// A grid cell handed to a classifier.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub row: usize,
    /// Position of the item within its row.
    pub position: usize,
    pub item: &'a RowItem,
}

/// Assigns meaning to grid cells (template matching, OCR, ...).
pub trait CellClassifier {
    type Output;

    fn classify(&mut self, cell: Cell<'_>) -> Self::Output;
}

impl<F, T> CellClassifier for F
where
    F: FnMut(Cell<'_>) -> T,
{
    type Output = T;

    fn classify(&mut self, cell: Cell<'_>) -> T {
        self(cell)
    }
}

/// Expected grid shape for a known screen layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutExpectation {
    pub rows: usize,
    pub columns: usize,
    /// The final row may hold fewer items than `columns`.
    pub partial_last_row: bool,
}

impl LayoutExpectation {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            partial_last_row: false,
        }
    }

    pub fn with_partial_last_row(mut self) -> Self {
        self.partial_last_row = true;
        self
    }

    /// Whether a list of row lengths fits this layout.
    pub fn accepts(&self, lengths: &[usize]) -> bool {
        if lengths.len() != self.rows {
            return false;
        }
        lengths.iter().enumerate().all(|(idx, &len)| {
            if self.partial_last_row && idx + 1 == lengths.len() {
                len > 0 && len <= self.columns
            } else {
                len == self.columns
            }
        })
    }
}

impl Matrix {
    /// Runs `classifier` over every cell, top to bottom and left to right.
    pub fn classify_cells<C: CellClassifier>(&self, classifier: &mut C) -> Vec<Vec<C::Output>> {
        self.iter()
            .enumerate()
            .map(|(row, items)| {
                items
                    .iter()
                    .enumerate()
                    .map(|(position, item)| {
                        classifier.classify(Cell {
                            row,
                            position,
                            item,
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Checks the grid's shape against a known layout.
    pub fn check_layout(&self, expected: &LayoutExpectation) -> Result<()> {
        let actual = self.row_lengths();
        if expected.accepts(&actual) {
            Ok(())
        } else {
            Err(GridError::LayoutMismatch {
                expected_rows: expected.rows,
                expected_columns: expected.columns,
                actual,
            })
        }
    }
}
