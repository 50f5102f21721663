//! Outcome of a collision test

/// Result of testing a sweep against a cell or object
///
/// Only `Ok` and `Collided` are produced by concrete tests. `Invalid` is the
/// answer of a cell kind that has no collision model of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionState {
    /// No model for this test
    #[default]
    Invalid,
    /// The sweep is clear
    Ok,
    /// The sweep hit something
    Collided,
}

impl TransitionState {
    /// True for `Collided`
    pub const fn is_collided(self) -> bool {
        matches!(self, Self::Collided)
    }
}
