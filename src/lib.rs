pub mod algorithms;
pub mod batch_simulation;
pub mod config;
pub mod edits;
pub mod error;
pub mod grid;
pub mod observer;
pub mod presenter;
pub mod simulation;
pub mod statistics;

pub use algorithms::common::SearchStrategy;
pub use algorithms::engine::{Outcome, Progress, SearchEngine, Status};
pub use edits::{Edit, InputSource, ObstacleEditBatch};
pub use error::{FailureReason, PathfindingError};
pub use grid::{Cell, CellView, GridModel, Occupancy};
pub use observer::{StepEvent, StepObserver};
