//! Matrix-wide item statistics.

use crate::error::{GridError, Result};
use crate::geometry::mean;
use crate::row::Row;

/// Snapshot of the average item geometry across a set of rows.
///
/// Widths and heights are averaged per row first and then across rows, so a
/// long row does not outweigh a short one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStats {
    pub average_width: f64,
    pub average_height: f64,
    /// Mean of the rows' item gaps; `None` when no row defines one or the
    /// mean is zero.
    pub average_gap: Option<f64>,
}

impl GridStats {
    /// Computes the statistics, failing when width or height cannot be
    /// averaged.
    pub fn from_rows(rows: &[Row]) -> Result<Self> {
        Ok(Self {
            average_width: average_width(rows)?,
            average_height: average_height(rows)?,
            average_gap: average_gap(rows),
        })
    }

    pub fn gap(&self) -> Result<f64> {
        self.average_gap
            .ok_or(GridError::DegenerateGeometry("average item gap"))
    }
}

pub(crate) fn average_width(rows: &[Row]) -> Result<f64> {
    mean(rows.iter().filter_map(Row::average_width))
        .filter(|w| *w > 0.0)
        .ok_or(GridError::DegenerateGeometry("average item width"))
}

pub(crate) fn average_height(rows: &[Row]) -> Result<f64> {
    mean(rows.iter().filter_map(Row::average_height))
        .filter(|h| *h > 0.0)
        .ok_or(GridError::DegenerateGeometry("average item height"))
}

pub(crate) fn average_gap(rows: &[Row]) -> Option<f64> {
    mean(rows.iter().filter_map(Row::item_gap)).filter(|gap| *gap != 0.0)
}
