//! Snapping items to the bounds of their row and column.

use crate::column::{Column, ColumnSet};
use crate::error::{GridError, Result};
use crate::geometry::Rectangle;
use crate::stats;

use super::Matrix;

/// Per-row bands an item is measured against.
#[derive(Debug, Clone, Copy)]
struct Bands {
    avg_w: f64,
    avg_h: f64,
    width_diff: f64,
    height_diff: f64,
    adjusted_w: f64,
    adjusted_h: f64,
    height_threshold: f64,
    row_top: f64,
    adjusted_row_top: f64,
    row_bottom: f64,
}

impl Matrix {
    /// Re-derives and balances the columns, then snaps every item to its
    /// column and row.
    ///
    /// Per item, in order: clamp overflow past the column edges; pull a top
    /// edge that sits lower than the tolerated row top up to the row top;
    /// extend the bottom edge to the row bottom; rewrite a width that strays
    /// from the average (or makes the item wider than tall) to the average
    /// width, still inside the column; and the same for height.
    pub fn balance(&mut self) -> Result<()> {
        self.columns = ColumnSet::derive(&self.rows);
        self.columns.balance();

        let avg_w = stats::average_width(&self.rows)?;
        let avg_h = stats::average_height(&self.rows)?;
        let thresholds = self.params.balance;
        let width_diff = thresholds.width_diff_threshold * avg_w;
        let height_diff = thresholds.height_diff_threshold * avg_h;

        for row in &mut self.rows {
            let Some(row_bottom) = row.row_bottom() else {
                continue;
            };
            let bands = Bands {
                avg_w,
                avg_h,
                width_diff,
                height_diff,
                adjusted_w: avg_w + width_diff,
                adjusted_h: avg_h + height_diff,
                height_threshold: thresholds.height_diff_threshold,
                row_top: row_bottom - avg_h,
                adjusted_row_top: row_bottom - (avg_h + height_diff),
                row_bottom,
            };
            for rect in row.rectangles_mut() {
                let column = self.columns[self.columns.find_column(rect)?];
                snap(rect, column, &bands);
                if !rect.is_valid() {
                    return Err(GridError::DegenerateGeometry("balanced item size"));
                }
            }
        }
        Ok(())
    }
}

fn snap(rect: &mut Rectangle, column: Column, b: &Bands) {
    if rect.x() < column.x {
        rect.set_x(column.x);
    }
    if rect.x2() > column.x2 {
        rect.set_x2(column.x2);
    }
    if rect.y() > b.adjusted_row_top {
        rect.set_y(b.row_top);
    }
    if rect.y2() < b.row_bottom * (1.0 + b.height_threshold) {
        rect.set_y2(b.row_bottom);
    }

    let (w, h) = (rect.width(), rect.height());
    if (w - b.adjusted_w).abs() > b.width_diff || w - h > b.width_diff {
        rect.set_x(rect.x().max(column.x));
        rect.set_x2(rect.x() + b.avg_w);
        if rect.x2() > column.x2 {
            rect.set_x2(column.x2);
        }
    }

    let (w, h) = (rect.width(), rect.height());
    if (h - b.adjusted_h).abs() > b.height_diff || h - w > b.height_diff {
        let y = rect.y().max(b.row_bottom - b.avg_h);
        rect.set_y(y);
        rect.set_y2(y + b.avg_h);
    }
}
