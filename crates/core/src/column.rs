//! Column boundaries derived from the horizontal extents of row items.
//!
//! Columns are not authoritative: a [`ColumnSet`] is rebuilt from the rows
//! whenever the matrix balances, by merging every chain of horizontally
//! overlapping rectangles into one band.

use std::ops::Index;

use crate::error::{GridError, Result};
use crate::geometry::{Rectangle, Span};
use crate::row::Row;

/// Bounds of one column.
pub type Column = Span;

/// Widths closer than this are treated as equal when balancing.
const WIDTH_EPSILON: f64 = 1e-9;

/// Ordered, non-overlapping column bands, left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clusters the items of all rows into columns.
    pub fn derive<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Row>,
    {
        Self::from_spans(
            rows.into_iter()
                .flat_map(|row| row.iter().map(|item| item.rectangle().span())),
        )
    }

    /// Clusters spans by interval overlap. Any two overlapping spans end up in
    /// the same column, directly or through a chain of other spans; touching
    /// spans stay apart.
    pub fn from_spans<I: IntoIterator<Item = Span>>(spans: I) -> Self {
        let mut spans: Vec<Span> = spans.into_iter().collect();
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut columns: Vec<Column> = Vec::new();
        for span in spans {
            match columns.last_mut() {
                Some(current) if span.x < current.x2 => current.absorb(&span),
                _ => columns.push(span),
            }
        }
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Equalizes the widths of adjacent columns.
    ///
    /// Every column narrower than the widest one grows to that width around
    /// its centre, left to right. Growth stops at the previous column's right
    /// edge (or `x = 0` for the first column) and at the next column's left
    /// edge, so the columns never overlap.
    pub fn balance(&mut self) {
        let Some(target) = self.columns.iter().map(Span::width).reduce(f64::max) else {
            return;
        };
        for i in 0..self.columns.len() {
            let column = self.columns[i];
            let deficit = target - column.width();
            if deficit <= WIDTH_EPSILON {
                continue;
            }
            let floor = match i {
                0 => column.x.min(0.0),
                _ => self.columns[i - 1].x2,
            };
            let ceiling = self.columns.get(i + 1).map_or(f64::INFINITY, |c| c.x);
            let x = (column.x - deficit / 2.0).max(floor);
            self.columns[i] = Span::new(x, (x + target).min(ceiling).max(column.x2));
        }
    }

    /// Finds the column holding `rectangle`.
    ///
    /// The column containing the rectangle's centre wins; otherwise the column
    /// with the largest horizontal overlap. Fails when the rectangle overlaps
    /// no column, which means the set is stale and should be re-derived.
    pub fn find_column(&self, rectangle: &Rectangle) -> Result<usize> {
        let span = rectangle.span();
        let center = span.center();
        if let Some(idx) = self.columns.iter().position(|c| c.contains(center)) {
            return Ok(idx);
        }
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (idx, c.overlap(&span)))
            .filter(|(_, overlap)| *overlap > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
            .ok_or(GridError::ColumnNotFound {
                x: span.x,
                x2: span.x2,
            })
    }
}

impl Index<usize> for ColumnSet {
    type Output = Column;

    fn index(&self, index: usize) -> &Column {
        &self.columns[index]
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
