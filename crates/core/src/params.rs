//! Reconstruction parameters.
//!
//! Contains MatrixParams for ingestion and balancing, and PruneOptions for
//! the prune/gap-fill pass.

/// What a row does with a rectangle whose collision merge was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Discard the rectangle.
    #[default]
    Drop,
    /// Keep the rectangle as a standalone item next to the one it overlaps.
    InsertAsNew,
}

/// How a row treats a new rectangle that overlaps one of its items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionRule {
    /// How far (as a fraction of the row's average size) the union of two
    /// colliding rectangles may deviate from the average before the merge is
    /// rejected.
    pub allowance: f64,
    pub policy: CollisionPolicy,
}

impl Default for CollisionRule {
    fn default() -> Self {
        Self {
            allowance: 0.25,
            policy: CollisionPolicy::Drop,
        }
    }
}

/// Tolerances for the balancing pass.
///
/// Both thresholds are fractions of the matrix-wide average item size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceParams {
    /// Allowed width deviation before an item's width is rewritten.
    pub width_diff_threshold: f64,
    /// Allowed height deviation before an item's height is rewritten.
    pub height_diff_threshold: f64,
}

impl Default for BalanceParams {
    fn default() -> Self {
        Self {
            width_diff_threshold: 0.1,
            height_diff_threshold: 0.1,
        }
    }
}

/// Parameters for building a matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixParams {
    /// Fraction of vertical overlap a rectangle needs with an existing row to
    /// join it instead of starting a new row.
    pub spacing_percent: f64,

    pub collision: CollisionRule,

    pub balance: BalanceParams,
}

impl Default for MatrixParams {
    fn default() -> Self {
        Self {
            spacing_percent: 0.5,
            collision: CollisionRule::default(),
            balance: BalanceParams::default(),
        }
    }
}

impl MatrixParams {
    pub fn with_spacing_percent(mut self, spacing_percent: f64) -> Self {
        self.spacing_percent = spacing_percent;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision.policy = policy;
        self
    }
}

/// Options for [`Matrix::prune`](crate::matrix::Matrix::prune).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneOptions {
    /// Rows shorter than this are filled or removed.
    pub threshold: usize,
    /// Try to infer missing cells before removing a short row.
    pub fill_missing: bool,
    /// Rows at or below this length are removed even when `fill_missing` is set.
    pub hard_threshold: usize,
}

impl PruneOptions {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            fill_missing: true,
            hard_threshold: 1,
        }
    }

    pub fn fill_missing(mut self, fill: bool) -> Self {
        self.fill_missing = fill;
        self
    }

    pub fn hard_threshold(mut self, hard_threshold: usize) -> Self {
        self.hard_threshold = hard_threshold;
        self
    }
}
