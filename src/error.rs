use crate::grid::Cell;
use std::fmt;

/// Errors returned synchronously by grid edits, the search engine, and path
/// reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathfindingError {
    /// Coordinate outside `[0, height) x [0, width)`.
    OutOfBounds { cell: Cell, width: usize, height: usize },
    /// Start or goal designation attempted on a blocked cell.
    CellBlocked { cell: Cell },
    /// Operation invoked in a state that forbids it.
    InvalidState { detail: String },
    /// Predecessor chain is cyclic or has a missing link. Always a bug.
    BrokenChain { at: Cell },
    /// Grid dimensions must both be at least 1.
    InvalidDimensions { width: usize, height: usize },
}

impl PathfindingError {
    pub(crate) fn invalid_state(detail: impl Into<String>) -> Self {
        PathfindingError::InvalidState {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PathfindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                cell,
                width,
                height,
            } => write!(f, "cell {cell} is outside the {height}x{width} grid"),
            Self::CellBlocked { cell } => write!(f, "cell {cell} is blocked"),
            Self::InvalidState { detail } => write!(f, "invalid state: {detail}"),
            Self::BrokenChain { at } => {
                write!(f, "predecessor chain broken at {at}")
            }
            Self::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions {height}x{width} must both be at least 1")
            }
        }
    }
}

impl std::error::Error for PathfindingError {}

/// Why a run ended in `Failed`. These are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Frontier exhausted without reaching the goal.
    NoPathExists,
    /// Start or goal designation changed mid-run.
    GoalUnreachableConfigChanged,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoPathExists => write!(f, "no path exists"),
            FailureReason::GoalUnreachableConfigChanged => {
                write!(f, "start or goal changed during the search")
            }
        }
    }
}
