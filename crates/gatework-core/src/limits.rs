//! Engine limits.

/// Bounds on propagation and composition.
///
/// `max_reentry` is the oscillation guard: an output whose value
/// assignment re-enters itself more than this many times is treated as an
/// oscillating feedback loop and has its driven inputs severed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Nested re-assignments tolerated per output before the guard trips.
    pub max_reentry: usize,
    /// Maximum nesting depth of groups inside groups.
    pub max_group_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_reentry: 10,
            max_group_depth: 32,
        }
    }
}

impl Limits {
    /// Create limits with custom values.
    pub fn new(max_reentry: usize, max_group_depth: usize) -> Self {
        Self {
            max_reentry,
            max_group_depth,
        }
    }

    /// Permissive limits for large generated circuits.
    pub fn permissive() -> Self {
        Self {
            max_reentry: 64,
            max_group_depth: 256,
        }
    }

    /// Strict limits: trips the guard early and keeps hierarchies shallow.
    pub fn strict() -> Self {
        Self {
            max_reentry: 4,
            max_group_depth: 8,
        }
    }
}
