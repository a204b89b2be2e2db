//! Removing short rows and inferring missing cells.

use smallvec::SmallVec;
use tracing::{info, warn};

use crate::error::{GridError, Result};
use crate::geometry::Rectangle;
use crate::params::PruneOptions;
use crate::row::{AppendOutcome, Row};
use crate::stats::GridStats;

use super::Matrix;

type ColumnIndices = SmallVec<[usize; 16]>;

/// A row deleted by [`Matrix::prune`], indexed as before any deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedRow {
    pub index: usize,
    pub len: usize,
}

/// A row that went through gap-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilledRow {
    pub index: usize,
    pub inserted: usize,
}

/// What [`Matrix::prune`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Deleted rows in ascending index order.
    pub removed: Vec<RemovedRow>,
    pub filled: Vec<FilledRow>,
    /// Rows whose gap-fill failed and were left as they were.
    pub aborted: Vec<usize>,
}

impl Matrix {
    /// Balances the grid, then fills or removes rows shorter than
    /// `options.threshold`.
    ///
    /// The last row in the list is never touched. A short row is filled when
    /// `fill_missing` is set and it is longer than `hard_threshold`;
    /// otherwise it is removed. Every row ends sorted by `x`.
    ///
    /// A failure to compute a matrix-wide statistic aborts the whole pass and
    /// leaves the matrix exactly as it was, unbalanced included. Any other
    /// failure while filling a row leaves that row unchanged and is recorded
    /// in [`PruneReport::aborted`].
    pub fn prune(&mut self, options: PruneOptions) -> Result<PruneReport> {
        if self.rows.is_empty() {
            return Ok(PruneReport::default());
        }
        let mut work = self.clone();
        work.balance()?;
        let stats = work.stats()?;
        let report = work.prune_rows(options, &stats)?;
        *self = work;
        Ok(report)
    }

    /// Fills or removes the short rows of an already balanced matrix.
    fn prune_rows(&mut self, options: PruneOptions, stats: &GridStats) -> Result<PruneReport> {
        let mut report = PruneReport::default();
        let mut doomed = Vec::new();
        let last = self.rows.len().saturating_sub(1);

        for index in 0..self.rows.len() {
            let len = self.rows[index].len();
            if index != last && len < options.threshold {
                if options.fill_missing && len > options.hard_threshold {
                    match self.fill_row(index, stats) {
                        Ok((row, inserted)) => {
                            self.rows[index] = row;
                            report.filled.push(FilledRow { index, inserted });
                        }
                        Err(err @ GridError::DegenerateGeometry(_)) => return Err(err),
                        Err(err) => {
                            warn!(row = index, error = %err, "gap-fill aborted, row left short");
                            report.aborted.push(index);
                        }
                    }
                } else {
                    doomed.push(index);
                }
            }
            self.rows[index].sort();
        }

        if !doomed.is_empty() {
            info!(
                count = doomed.len(),
                rows = ?doomed,
                "removing short rows from matrix, check that segmentation succeeded"
            );
            for &index in doomed.iter().rev() {
                let row = self.remove_row(index);
                info!(row = index, len = row.len(), items = %row, "removed row");
                report.removed.push(RemovedRow {
                    index,
                    len: row.len(),
                });
            }
            report.removed.reverse();
        }
        Ok(report)
    }

    /// Fills the columns a row is missing, working on a copy of the row.
    fn fill_row(&self, index: usize, stats: &GridStats) -> Result<(Row, usize)> {
        let mut row = self.rows[index].clone();
        let row_bottom = row
            .row_bottom()
            .ok_or(GridError::DegenerateGeometry("row bottom"))?;
        let avg_w = stats.average_width;
        let avg_h = stats.average_height;
        let top = row_bottom - avg_h;

        let mut inserted = 0;
        let mut filled_between: SmallVec<[(Option<usize>, Option<usize>); 4]> = SmallVec::new();

        for column in 0..self.columns.len() {
            let occupied = self.occupied_columns(&row)?;
            if occupied.contains(&column) {
                continue;
            }
            let left = occupied.iter().copied().filter(|&c| c < column).max();
            let right = occupied.iter().copied().filter(|&c| c > column).min();
            if (left.is_none() && right.is_none()) || filled_between.contains(&(left, right)) {
                continue;
            }
            filled_between.push((left, right));

            match (left, right) {
                (Some(l), Some(r)) => {
                    let mut x = self.columns[l].x2;
                    let gap = self.columns[r].x - x;
                    let missing = (gap / avg_w).round();
                    if missing < 1.0 {
                        continue;
                    }
                    let spacing = (gap - missing * avg_w) / (missing + 1.0);
                    for _ in 0..missing as usize {
                        let rect = Rectangle::new(x + spacing, top, avg_w, avg_h)?;
                        x = rect.x2();
                        row.append_inferred(rect, None)?;
                        inserted += 1;
                    }
                }
                (Some(l), None) => {
                    let gap = fill_step(stats)? - avg_w;
                    let limit = self.fill_limit()?;
                    let mut x = self.columns[l].x2;
                    while x + gap + avg_w <= limit {
                        let rect = Rectangle::new(x + gap, top, avg_w, avg_h)?;
                        x = rect.x2();
                        if let AppendOutcome::Inserted(_) =
                            row.append_inferred(rect, Some(self.params.collision))?
                        {
                            inserted += 1;
                        }
                    }
                }
                (None, Some(r)) => {
                    let gap = fill_step(stats)? - avg_w;
                    let mut x = self.columns[r].x;
                    while x - gap - avg_w >= 0.0 {
                        let rect = Rectangle::new(x - gap - avg_w, top, avg_w, avg_h)?;
                        x = rect.x();
                        if let AppendOutcome::Inserted(_) =
                            row.append_inferred(rect, Some(self.params.collision))?
                        {
                            inserted += 1;
                        }
                    }
                }
                (None, None) => {}
            }
        }
        Ok((row, inserted))
    }

    /// Right edge that rightward fills must stay within.
    fn fill_limit(&self) -> Result<f64> {
        if !self.source_width.is_finite() {
            return Err(GridError::DegenerateGeometry("source width"));
        }
        Ok(self.source_width)
    }

    /// Columns represented in `row`. Inferred items outside every column are
    /// ignored; a detected item outside every column is an error.
    fn occupied_columns(&self, row: &Row) -> Result<ColumnIndices> {
        let mut occupied = ColumnIndices::new();
        for item in row {
            match self.columns.find_column(item.rectangle()) {
                Ok(idx) => occupied.push(idx),
                Err(_) if item.is_inferred() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(occupied)
    }
}

/// Distance from one edge-filled item to the next.
fn fill_step(stats: &GridStats) -> Result<f64> {
    let step = stats.average_width + stats.gap()?;
    if step <= 0.0 {
        return Err(GridError::DegenerateGeometry("average item pitch"));
    }
    Ok(step)
}
