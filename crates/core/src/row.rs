//! Rows: horizontal clusters of labelled rectangles.
//!
//! A row owns its items, keeps a label lookup in sync with item order, and
//! merges colliding detections when they stay close to the row's average
//! item size.

use std::fmt;
use std::ops::Index;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GridError, Result};
use crate::geometry::{Rectangle, mean};
use crate::params::{CollisionPolicy, CollisionRule};

/// Label prefix for items synthesized by gap-fill.
pub const INFERRED_LABEL_PREFIX: &str = "inferred-";

/// Where a row item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrigin {
    /// Supplied by segmentation.
    Detected,
    /// Synthesized for a missing cell.
    Inferred,
}

/// A rectangle and the label it was reported with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowItem {
    rectangle: Rectangle,
    label: String,
    origin: ItemOrigin,
}

impl RowItem {
    pub fn rectangle(&self) -> &Rectangle {
        &self.rectangle
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn origin(&self) -> ItemOrigin {
        self.origin
    }

    pub fn is_inferred(&self) -> bool {
        self.origin == ItemOrigin::Inferred
    }
}

/// Result of testing a rectangle against the items of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Nothing overlaps.
    Clear,
    /// Merged into the item at this index.
    Merged(usize),
    /// Overlaps the item at this index, but the union was too large.
    Rejected(usize),
}

/// What [`Row::append`] did with a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Inserted(usize),
    Merged(usize),
    Dropped,
}

/// An ordered sequence of row items sharing an approximate vertical position.
#[derive(Debug, Clone, Default)]
pub struct Row {
    items: Vec<RowItem>,
    index: FxHashMap<String, usize>,
    head: Option<f64>,
    inferred: usize,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top edge of the first rectangle ever appended. Never recomputed.
    pub fn head(&self) -> Option<f64> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[RowItem] {
        &self.items
    }

    pub fn get_index(&self, index: usize) -> Option<&RowItem> {
        self.items.get(index)
    }

    /// Looks an item up by label, returning it with its position.
    pub fn get(&self, label: &str) -> Option<(&RowItem, usize)> {
        let idx = *self.index.get(label)?;
        Some((&self.items[idx], idx))
    }

    /// Adds a detected rectangle to the row.
    ///
    /// With a collision rule, an overlapping rectangle is merged into the
    /// item it overlaps when the union stays within the rule's allowance. A
    /// rejected merge follows the rule's policy. Without a rule the rectangle
    /// is always inserted.
    pub fn append(
        &mut self,
        rectangle: Rectangle,
        label: impl Into<String>,
        collision: Option<CollisionRule>,
    ) -> Result<AppendOutcome> {
        self.push_checked(rectangle, label.into(), ItemOrigin::Detected, collision)
    }

    /// Adds a synthesized rectangle under a fresh `inferred-<n>` label.
    pub(crate) fn append_inferred(
        &mut self,
        rectangle: Rectangle,
        collision: Option<CollisionRule>,
    ) -> Result<AppendOutcome> {
        let label = loop {
            let candidate = format!("{INFERRED_LABEL_PREFIX}{}", self.inferred);
            self.inferred += 1;
            if !self.index.contains_key(&candidate) {
                break candidate;
            }
        };
        self.push_checked(rectangle, label, ItemOrigin::Inferred, collision)
    }

    fn push_checked(
        &mut self,
        rectangle: Rectangle,
        label: String,
        origin: ItemOrigin,
        collision: Option<CollisionRule>,
    ) -> Result<AppendOutcome> {
        if let Some(rule) = collision {
            match self.check_collision(&rectangle, &label, rule.allowance) {
                CollisionOutcome::Clear => {}
                CollisionOutcome::Merged(idx) => return Ok(AppendOutcome::Merged(idx)),
                CollisionOutcome::Rejected(idx) => match rule.policy {
                    CollisionPolicy::Drop => {
                        info!(label = %label, rectangle = %rectangle, against = %self.items[idx].label, "dropping rectangle after rejected merge");
                        return Ok(AppendOutcome::Dropped);
                    }
                    CollisionPolicy::InsertAsNew => {
                        info!(label = %label, rectangle = %rectangle, against = %self.items[idx].label, "keeping rectangle after rejected merge");
                    }
                },
            }
        }

        if self.index.contains_key(&label) {
            return Err(GridError::DuplicateLabel(label));
        }
        if self.head.is_none() {
            self.head = Some(rectangle.y());
        }
        let idx = self.items.len();
        self.index.insert(label.clone(), idx);
        self.items.push(RowItem {
            rectangle,
            label,
            origin,
        });
        Ok(AppendOutcome::Inserted(idx))
    }

    /// Tests `rectangle` against every item and merges it into the first
    /// overlapping item whose union with it stays within `allowance` of the
    /// row's average width and height. The merged item keeps its label.
    pub fn check_collision(
        &mut self,
        rectangle: &Rectangle,
        label: &str,
        allowance: f64,
    ) -> CollisionOutcome {
        let (Some(avg_w), Some(avg_h)) = (self.average_width(), self.average_height()) else {
            return CollisionOutcome::Clear;
        };

        let mut rejected = None;
        for (idx, item) in self.items.iter_mut().enumerate() {
            if !item.rectangle.overlaps(rectangle) {
                continue;
            }
            let merged = item.rectangle.union(rectangle);
            if (avg_w - merged.width()).abs() < avg_w * allowance
                && (avg_h - merged.height()).abs() < avg_h * allowance
            {
                debug!(label, into = %item.label, merged = %merged, "merged colliding rectangle");
                item.rectangle = merged;
                return CollisionOutcome::Merged(idx);
            }
            info!(label, against = %item.label, union = %merged, "collision merge rejected");
            rejected.get_or_insert(idx);
        }
        rejected.map_or(CollisionOutcome::Clear, CollisionOutcome::Rejected)
    }

    /// Stable sort by left edge; the label lookup follows the new order.
    pub fn sort(&mut self) {
        self.items
            .sort_by(|a, b| a.rectangle.x().total_cmp(&b.rectangle.x()));
        self.index.clear();
        for (idx, item) in self.items.iter().enumerate() {
            self.index.insert(item.label.clone(), idx);
        }
    }

    pub fn average_width(&self) -> Option<f64> {
        mean(self.items.iter().map(|i| i.rectangle.width()))
    }

    pub fn average_height(&self) -> Option<f64> {
        mean(self.items.iter().map(|i| i.rectangle.height()))
    }

    /// Average horizontal gap between neighbouring items in left-to-right
    /// order. `None` with fewer than two items or when the average is zero.
    pub fn item_gap(&self) -> Option<f64> {
        let gaps = self
            .items
            .iter()
            .map(|i| i.rectangle.span())
            .sorted_by(|a, b| a.x.total_cmp(&b.x))
            .tuple_windows()
            .map(|(a, b)| b.x - a.x2);
        mean(gaps).filter(|gap| *gap != 0.0)
    }

    /// Lowest bottom edge among the items.
    pub fn row_bottom(&self) -> Option<f64> {
        self.items.iter().map(|i| i.rectangle.y2()).reduce(f64::max)
    }

    pub(crate) fn rectangles_mut(&mut self) -> impl Iterator<Item = &mut Rectangle> {
        self.items.iter_mut().map(|i| &mut i.rectangle)
    }
}

impl Index<usize> for Row {
    type Output = RowItem;

    fn index(&self, index: usize) -> &RowItem {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a RowItem;
    type IntoIter = std::slice::Iter<'a, RowItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, item) in self.items.iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            write!(f, "[{} {}]", item.label, item.rectangle)?;
        }
        Ok(())
    }
}
