use crate::algorithms::frontier::{FifoFrontier, Frontier, PriorityFrontier};
use crate::grid::Cell;
use std::fmt;

/// Per-move cost and remaining-distance estimate used by the engine.
pub trait CostModel {
    /// Cost of moving between two orthogonally adjacent cells.
    fn cost(&self, _from: Cell, _to: Cell) -> u32 {
        1
    }

    /// Estimate of the remaining cost from `cell` to `goal`. Must never
    /// overestimate and must satisfy the triangle inequality.
    fn heuristic(&self, cell: Cell, goal: Cell) -> u32;
}

/// Uniform step cost with no estimate. Pairs with the FIFO frontier.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformCost;

impl CostModel for UniformCost {
    fn heuristic(&self, _cell: Cell, _goal: Cell) -> u32 {
        0
    }
}

/// Uniform step cost with Manhattan distance as the estimate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManhattanCost;

impl CostModel for ManhattanCost {
    fn heuristic(&self, cell: Cell, goal: Cell) -> u32 {
        cell.manhattan(goal)
    }
}

/// Selects the frontier ordering and cost model for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    BreadthFirst,
    BestFirst,
}

impl SearchStrategy {
    pub const ALL: [SearchStrategy; 2] = [SearchStrategy::BreadthFirst, SearchStrategy::BestFirst];

    pub fn frontier(self) -> Box<dyn Frontier> {
        match self {
            SearchStrategy::BreadthFirst => Box::new(FifoFrontier::new()),
            SearchStrategy::BestFirst => Box::new(PriorityFrontier::new()),
        }
    }

    pub fn cost_model(self) -> Box<dyn CostModel> {
        match self {
            SearchStrategy::BreadthFirst => Box::new(UniformCost),
            SearchStrategy::BestFirst => Box::new(ManhattanCost),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SearchStrategy::BreadthFirst => "bfs",
            SearchStrategy::BestFirst => "astar",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
