use crate::algorithms::engine::{SearchEngine, Status};
use crate::error::PathfindingError;
use crate::grid::Cell;
use rustc_hash::FxHashSet;

/// Walks predecessor links from goal back to start and returns the path in
/// start-to-goal order. Repeated calls on a finished engine return the same
/// sequence.
pub fn reconstruct(engine: &SearchEngine) -> Result<Vec<Cell>, PathfindingError> {
    if engine.status() != Status::Succeeded {
        return Err(PathfindingError::invalid_state(format!(
            "no path to reconstruct: search {}",
            engine.status()
        )));
    }
    walk(engine.start(), engine.goal(), |cell| engine.predecessor(cell))
}

pub(crate) fn walk<F>(start: Cell, goal: Cell, predecessor: F) -> Result<Vec<Cell>, PathfindingError>
where
    F: Fn(Cell) -> Option<Cell>,
{
    let mut path = vec![goal];
    let mut seen = FxHashSet::default();
    seen.insert(goal);

    let mut current = goal;
    while current != start {
        let prev = predecessor(current).ok_or(PathfindingError::BrokenChain { at: current })?;
        if !seen.insert(prev) {
            return Err(PathfindingError::BrokenChain { at: prev });
        }
        path.push(prev);
        current = prev;
    }

    path.reverse();
    Ok(path)
}

/// Total cost of a path under uniform step cost.
pub fn path_cost(path: &[Cell]) -> u32 {
    path.len().saturating_sub(1) as u32
}
