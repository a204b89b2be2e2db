//! Axis-aligned geometry shared by rows, columns and the matrix.
//!
//! Coordinates use a top-left origin: `y` grows downwards, so `y2` is the
//! bottom edge of a rectangle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// An axis-aligned box with derived right (`x2`) and bottom (`y2`) edges.
///
/// Rectangles are plain values. The balancing pass rewrites edges through
/// crate-private setters on the copy owned by a row item, so a snapshot held
/// by a caller is never changed behind its back.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RectangleRepr", into = "RectangleRepr")]
pub struct Rectangle {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct RectangleRepr {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl TryFrom<RectangleRepr> for Rectangle {
    type Error = GridError;

    fn try_from(r: RectangleRepr) -> Result<Self> {
        Rectangle::new(r.x, r.y, r.width, r.height)
    }
}

impl From<Rectangle> for RectangleRepr {
    fn from(r: Rectangle) -> Self {
        RectangleRepr {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

impl Rectangle {
    /// Creates a rectangle, rejecting non-finite values and non-positive sizes.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        let finite = x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite();
        if !finite || width <= 0.0 || height <= 0.0 {
            return Err(GridError::InvalidRectangle {
                x,
                y,
                width,
                height,
            });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Creates a rectangle from its four edges.
    pub fn from_edges(x: f64, y: f64, x2: f64, y2: f64) -> Result<Self> {
        Self::new(x, y, x2 - x, y2 - y)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Horizontal extent of the rectangle.
    pub fn span(&self) -> Span {
        Span {
            x: self.x,
            x2: self.x2(),
        }
    }

    /// Strict overlap test: touching edges do not count.
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.x < other.x2() && self.x2() > other.x && self.y < other.y2() && self.y2() > other.y
    }

    /// Smallest rectangle containing both inputs.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rectangle {
            x,
            y,
            width: self.x2().max(other.x2()) - x,
            height: self.y2().max(other.y2()) - y,
        }
    }

    /// Both dimensions are positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Moves the left edge, keeping the right edge in place.
    pub(crate) fn set_x(&mut self, x: f64) {
        let x2 = self.x2();
        self.x = x;
        self.width = x2 - x;
    }

    /// Moves the right edge, keeping the left edge in place.
    pub(crate) fn set_x2(&mut self, x2: f64) {
        self.width = x2 - self.x;
    }

    /// Moves the top edge, keeping the bottom edge in place.
    pub(crate) fn set_y(&mut self, y: f64) {
        let y2 = self.y2();
        self.y = y;
        self.height = y2 - y;
    }

    /// Moves the bottom edge, keeping the top edge in place.
    pub(crate) fn set_y2(&mut self, y2: f64) {
        self.height = y2 - self.y;
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1}, {:.1}, {:.1}x{:.1})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// A closed horizontal interval `[x, x2]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub x: f64,
    pub x2: f64,
}

impl Span {
    pub fn new(x: f64, x2: f64) -> Self {
        Self { x, x2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x
    }

    pub fn center(&self) -> f64 {
        (self.x + self.x2) / 2.0
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.x && v <= self.x2
    }

    /// Strict interval overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.x < other.x2 && self.x2 > other.x
    }

    /// Length of the shared part of two spans, zero when disjoint.
    pub fn overlap(&self, other: &Span) -> f64 {
        (self.x2.min(other.x2) - self.x.max(other.x)).max(0.0)
    }

    /// Grows the span to cover `other` as well.
    pub fn absorb(&mut self, other: &Span) {
        self.x = self.x.min(other.x);
        self.x2 = self.x2.max(other.x2);
    }
}

/// Arithmetic mean, `None` for an empty input.
pub(crate) fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
