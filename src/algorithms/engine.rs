use crate::algorithms::common::{CostModel, SearchStrategy};
use crate::algorithms::frontier::Frontier;
use crate::algorithms::path;
use crate::edits::ObstacleEditBatch;
use crate::error::{FailureReason, PathfindingError};
use crate::grid::{Cell, GridModel};
use crate::observer::{StepEvent, StepObserver};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fmt;

/// Construction seeds the frontier and lands directly in `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Succeeded,
    Failed(FailureReason),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => write!(f, "running"),
            Status::Succeeded => write!(f, "succeeded"),
            Status::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { path: Vec<Cell>, cost: u32 },
    Failed(FailureReason),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }

    pub fn path(&self) -> Option<&[Cell]> {
        match self {
            Outcome::Succeeded { path, .. } => Some(path),
            Outcome::Failed(_) => None,
        }
    }
}

/// What a single `advance()` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Stepped(StepEvent),
    Finished(Outcome),
}

/// Incremental search over a private grid snapshot.
///
/// Each [`advance`](SearchEngine::advance) first applies every edit
/// submitted since the previous call, then expands exactly one cell.
/// Edits never land in the middle of an expansion. The engine is built
/// for one run and discarded once it leaves `Running`.
pub struct SearchEngine {
    strategy: SearchStrategy,
    snapshot: GridModel,
    start: Cell,
    goal: Cell,
    frontier: Box<dyn Frontier>,
    cost_model: Box<dyn CostModel>,
    visited: FxHashSet<Cell>,
    visit_order: Vec<Cell>,
    g_cost: FxHashMap<Cell, u32>,
    predecessor: FxHashMap<Cell, Cell>,
    pending: VecDeque<ObstacleEditBatch>,
    status: Status,
    steps: usize,
}

impl SearchEngine {
    /// Snapshots `grid` and seeds the frontier with its start cell.
    pub fn new(grid: &GridModel, strategy: SearchStrategy) -> Result<Self, PathfindingError> {
        let start = grid
            .start()
            .ok_or_else(|| PathfindingError::invalid_state("no start cell designated"))?;
        let goal = grid
            .goal()
            .ok_or_else(|| PathfindingError::invalid_state("no goal cell designated"))?;

        let cost_model = strategy.cost_model();
        let mut frontier = strategy.frontier();
        frontier.push(start, cost_model.heuristic(start, goal));

        let mut g_cost = FxHashMap::default();
        g_cost.insert(start, 0);

        tracing::debug!(%start, %goal, %strategy, "search engine created");
        Ok(SearchEngine {
            strategy,
            snapshot: grid.clone(),
            start,
            goal,
            frontier,
            cost_model,
            visited: FxHashSet::default(),
            visit_order: Vec::new(),
            g_cost,
            predecessor: FxHashMap::default(),
            pending: VecDeque::new(),
            status: Status::Running,
            steps: 0,
        })
    }

    /// Queues edits for the next `advance()`. Batches submitted between two
    /// steps are applied in submission order, each one atomically.
    pub fn submit(&mut self, batch: ObstacleEditBatch) {
        if !batch.is_empty() {
            self.pending.push_back(batch);
        }
    }

    /// Applies pending edits, then performs one expansion.
    ///
    /// Fails with `InvalidState` once the run is over. Every pending batch
    /// is tried in order. Batches that cannot be applied are dropped on their
    /// own without affecting the others. If any was dropped, the first error
    /// is returned and no expansion happens in that call.
    pub fn advance<O: StepObserver + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<Progress, PathfindingError> {
        if self.status != Status::Running {
            return Err(PathfindingError::invalid_state(format!(
                "cannot advance a search that has {}",
                self.status
            )));
        }

        let mut rejected = None;
        while let Some(batch) = self.pending.pop_front() {
            match batch.apply_to(&mut self.snapshot) {
                Ok(()) => tracing::debug!(edits = batch.len(), "applied edit batch"),
                Err(err) => {
                    tracing::warn!(%err, edits = batch.len(), "rejected edit batch");
                    rejected.get_or_insert(err);
                }
            }
        }
        if let Some(err) = rejected {
            return Err(err);
        }

        if self.snapshot.start() != Some(self.start) || self.snapshot.goal() != Some(self.goal) {
            let outcome = Outcome::Failed(FailureReason::GoalUnreachableConfigChanged);
            return Ok(self.finish(outcome, observer));
        }

        let Some(current) = self.pop_expandable() else {
            let outcome = Outcome::Failed(FailureReason::NoPathExists);
            return Ok(self.finish(outcome, observer));
        };

        self.visited.insert(current);
        self.visit_order.push(current);
        self.steps += 1;

        let current_g = self.g_cost.get(&current).copied().unwrap_or_default();
        if current == self.goal {
            self.status = Status::Succeeded;
            let path = path::reconstruct(self)?;
            let crossed = self.blocked_cells_on(&path);
            if !crossed.is_empty() {
                tracing::warn!(
                    cells = ?crossed,
                    "path crosses cells blocked after they were expanded"
                );
            }
            let outcome = Outcome::Succeeded {
                path,
                cost: current_g,
            };
            return Ok(self.finish(outcome, observer));
        }

        let mut newly_discovered = Vec::new();
        for neighbor in self.snapshot.neighbors(current) {
            if self.visited.contains(&neighbor) {
                continue;
            }
            let tentative = current_g + self.cost_model.cost(current, neighbor);
            let improves = self
                .g_cost
                .get(&neighbor)
                .map_or(true, |&known| tentative < known);
            if !improves {
                continue;
            }

            self.g_cost.insert(neighbor, tentative);
            self.predecessor.insert(neighbor, current);
            let priority = tentative + self.cost_model.heuristic(neighbor, self.goal);
            self.frontier.push(neighbor, priority);
            newly_discovered.push(neighbor);
        }

        let event = StepEvent {
            newly_discovered,
            expanded: current,
            step_count: self.steps,
            running_cost: current_g,
            priority: current_g + self.cost_model.heuristic(current, self.goal),
        };
        tracing::trace!(
            expanded = %event.expanded,
            step = event.step_count,
            cost = event.running_cost,
            discovered = event.newly_discovered.len(),
            "expanded cell"
        );
        observer.on_step(&event);
        Ok(Progress::Stepped(event))
    }

    /// Pops until a cell worth expanding turns up, discarding stale entries.
    fn pop_expandable(&mut self) -> Option<Cell> {
        while let Some(cell) = self.frontier.pop_min() {
            if self.visited.contains(&cell) {
                tracing::debug!(%cell, "skipping stale frontier entry");
                continue;
            }
            if !self.g_cost.contains_key(&cell) {
                // Dropped earlier as blocked; this is a leftover duplicate.
                continue;
            }
            if self.snapshot.is_blocked(cell) {
                // Blocked after discovery. Forget its cost so it can be
                // rediscovered if it is unblocked later.
                tracing::debug!(%cell, "dropping frontier entry blocked after discovery");
                self.g_cost.remove(&cell);
                self.predecessor.remove(&cell);
                continue;
            }
            return Some(cell);
        }
        None
    }

    fn blocked_cells_on(&self, path: &[Cell]) -> Vec<Cell> {
        path.iter()
            .copied()
            .filter(|&cell| self.snapshot.is_blocked(cell))
            .collect()
    }

    /// Cells of the found path that are blocked in the current snapshot.
    ///
    /// Expanded cells are never revisited, so a cell blocked after its
    /// expansion can still end up on the path. Empty unless the run succeeded.
    pub fn blocked_path_cells(&self) -> Vec<Cell> {
        match self.path() {
            Ok(path) => self.blocked_cells_on(&path),
            Err(_) => Vec::new(),
        }
    }

    fn finish<O: StepObserver + ?Sized>(&mut self, outcome: Outcome, observer: &mut O) -> Progress {
        self.status = match &outcome {
            Outcome::Succeeded { .. } => Status::Succeeded,
            Outcome::Failed(reason) => Status::Failed(*reason),
        };
        tracing::info!(
            strategy = %self.strategy,
            status = %self.status,
            steps = self.steps,
            "search finished"
        );
        observer.on_finished(&outcome);
        Progress::Finished(outcome)
    }

    /// Calls `advance()` until the run leaves `Running`.
    pub fn run_to_completion<O: StepObserver + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<Outcome, PathfindingError> {
        loop {
            if let Progress::Finished(outcome) = self.advance(observer)? {
                return Ok(outcome);
            }
        }
    }

    /// Start-to-goal path. Only valid once the run has succeeded.
    pub fn path(&self) -> Result<Vec<Cell>, PathfindingError> {
        path::reconstruct(self)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// The engine's private grid, as of the last applied batch.
    pub fn snapshot(&self) -> &GridModel {
        &self.snapshot
    }

    /// Expanded cells in expansion order.
    pub fn visit_order(&self) -> &[Cell] {
        &self.visit_order
    }

    pub fn is_visited(&self, cell: Cell) -> bool {
        self.visited.contains(&cell)
    }

    pub fn g_cost(&self, cell: Cell) -> Option<u32> {
        self.g_cost.get(&cell).copied()
    }

    pub fn predecessor(&self, cell: Cell) -> Option<Cell> {
        self.predecessor.get(&cell).copied()
    }

    pub fn frontier_cells(&self) -> Vec<Cell> {
        self.frontier.pending()
    }

    pub fn frontier_contains(&self, cell: Cell) -> bool {
        self.frontier.contains(cell)
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Number of expansions so far.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::Edit;
    use crate::grid::Occupancy;
    use crate::observer::{NoOpObserver, StepLog};

    fn grid(width: usize, height: usize, start: Cell, goal: Cell) -> GridModel {
        let mut grid = GridModel::new(width, height).unwrap();
        grid.designate_start(start).unwrap();
        grid.designate_goal(goal).unwrap();
        grid
    }

    #[test]
    fn needs_start_and_goal() {
        let mut g = GridModel::new(2, 2).unwrap();
        assert!(matches!(
            SearchEngine::new(&g, SearchStrategy::BreadthFirst),
            Err(PathfindingError::InvalidState { .. })
        ));
        g.designate_start(Cell::new(0, 0)).unwrap();
        assert!(SearchEngine::new(&g, SearchStrategy::BreadthFirst).is_err());
        g.designate_goal(Cell::new(1, 1)).unwrap();
        assert!(SearchEngine::new(&g, SearchStrategy::BreadthFirst).is_ok());
    }

    #[test]
    fn seeds_start() {
        let g = grid(3, 3, Cell::new(0, 0), Cell::new(2, 2));
        let engine = SearchEngine::new(&g, SearchStrategy::BestFirst).unwrap();
        assert_eq!(engine.status(), Status::Running);
        assert_eq!(engine.g_cost(Cell::new(0, 0)), Some(0));
        assert_eq!(engine.frontier_cells(), vec![Cell::new(0, 0)]);
        assert!(engine.visit_order().is_empty());
    }

    #[test]
    fn first_step_expands_start() {
        let g = grid(3, 3, Cell::new(1, 1), Cell::new(2, 2));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        let progress = engine.advance(&mut NoOpObserver).unwrap();
        let Progress::Stepped(event) = progress else {
            panic!("expected a step");
        };
        assert_eq!(event.expanded, Cell::new(1, 1));
        assert_eq!(event.step_count, 1);
        assert_eq!(event.running_cost, 0);
        assert_eq!(
            event.newly_discovered,
            vec![Cell::new(0, 1), Cell::new(2, 1), Cell::new(1, 0), Cell::new(1, 2)]
        );
        assert!(engine.is_visited(Cell::new(1, 1)));
        assert!(engine.frontier_contains(Cell::new(1, 2)));
        assert_eq!(engine.predecessor(Cell::new(0, 1)), Some(Cell::new(1, 1)));
    }

    #[test]
    fn start_equal_to_goal_succeeds_immediately() {
        let g = grid(2, 2, Cell::new(1, 0), Cell::new(1, 0));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BestFirst).unwrap();
        let outcome = engine.run_to_completion(&mut NoOpObserver).unwrap();
        assert_eq!(
            outcome,
            Outcome::Succeeded {
                path: vec![Cell::new(1, 0)],
                cost: 0
            }
        );
    }

    #[test]
    fn advance_after_terminal_is_invalid() {
        let g = grid(2, 1, Cell::new(0, 0), Cell::new(0, 1));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.run_to_completion(&mut NoOpObserver).unwrap();
        assert_eq!(engine.status(), Status::Succeeded);
        assert!(matches!(
            engine.advance(&mut NoOpObserver),
            Err(PathfindingError::InvalidState { .. })
        ));
    }

    #[test]
    fn walled_off_goal_fails_with_no_path() {
        let mut g = grid(3, 3, Cell::new(0, 0), Cell::new(2, 2));
        for cell in [Cell::new(1, 2), Cell::new(2, 1)] {
            g.set_occupancy(cell, Occupancy::Blocked).unwrap();
        }
        let mut engine = SearchEngine::new(&g, SearchStrategy::BestFirst).unwrap();
        let mut log = StepLog::new();
        let outcome = engine.run_to_completion(&mut log).unwrap();
        assert_eq!(outcome, Outcome::Failed(FailureReason::NoPathExists));
        assert_eq!(engine.status(), Status::Failed(FailureReason::NoPathExists));
        assert_eq!(log.outcome, Some(outcome));
        assert_eq!(log.steps.len(), 6);
    }

    #[test]
    fn clearing_goal_mid_run_fails() {
        let g = grid(5, 5, Cell::new(0, 0), Cell::new(4, 4));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.advance(&mut NoOpObserver).unwrap();
        engine.submit([Edit::ClearGoal].into_iter().collect());
        let progress = engine.advance(&mut NoOpObserver).unwrap();
        assert_eq!(
            progress,
            Progress::Finished(Outcome::Failed(FailureReason::GoalUnreachableConfigChanged))
        );
        assert_eq!(engine.visit_order().len(), 1);
    }

    #[test]
    fn moving_start_mid_run_fails() {
        let g = grid(5, 5, Cell::new(0, 0), Cell::new(4, 4));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BestFirst).unwrap();
        engine.submit([Edit::SetStart(Cell::new(1, 1))].into_iter().collect());
        let outcome = engine.run_to_completion(&mut NoOpObserver).unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed(FailureReason::GoalUnreachableConfigChanged)
        );
    }

    #[test]
    fn rejected_batch_is_dropped_and_search_continues() {
        let g = grid(3, 3, Cell::new(0, 0), Cell::new(2, 2));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.submit(
            [Edit::Block(Cell::new(1, 1)), Edit::Block(Cell::new(7, 7))]
                .into_iter()
                .collect(),
        );
        assert!(matches!(
            engine.advance(&mut NoOpObserver),
            Err(PathfindingError::OutOfBounds { .. })
        ));
        assert_eq!(engine.steps(), 0);
        assert!(!engine.snapshot().is_blocked(Cell::new(1, 1)));

        let outcome = engine.run_to_completion(&mut NoOpObserver).unwrap();
        assert!(outcome.is_success());
    }

    #[test]
    fn valid_batch_survives_a_rejected_one() {
        let g = grid(3, 3, Cell::new(0, 0), Cell::new(2, 2));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.submit([Edit::Block(Cell::new(1, 1))].into_iter().collect());
        engine.submit([Edit::Block(Cell::new(9, 9))].into_iter().collect());
        engine.submit([Edit::Block(Cell::new(0, 2))].into_iter().collect());

        assert!(matches!(
            engine.advance(&mut NoOpObserver),
            Err(PathfindingError::OutOfBounds { .. })
        ));
        assert_eq!(engine.steps(), 0);
        assert!(engine.snapshot().is_blocked(Cell::new(1, 1)));
        assert!(engine.snapshot().is_blocked(Cell::new(0, 2)));

        let outcome = engine.run_to_completion(&mut NoOpObserver).unwrap();
        let Outcome::Succeeded { path, cost } = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(cost, 4);
        assert!(!path.contains(&Cell::new(1, 1)));
    }

    #[test]
    fn batches_between_steps_apply_in_submission_order() {
        let g = grid(3, 1, Cell::new(0, 0), Cell::new(0, 2));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.submit([Edit::Block(Cell::new(0, 1))].into_iter().collect());
        engine.submit([Edit::Unblock(Cell::new(0, 1))].into_iter().collect());
        engine.advance(&mut NoOpObserver).unwrap();
        assert!(!engine.snapshot().is_blocked(Cell::new(0, 1)));

        engine.submit([Edit::Unblock(Cell::new(0, 1))].into_iter().collect());
        engine.submit([Edit::Block(Cell::new(0, 1))].into_iter().collect());
        let outcome = engine.run_to_completion(&mut NoOpObserver).unwrap();
        assert_eq!(outcome, Outcome::Failed(FailureReason::NoPathExists));
    }

    #[test]
    fn rejected_batch_still_sees_start_change_from_valid_one() {
        let g = grid(3, 3, Cell::new(0, 0), Cell::new(2, 2));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BestFirst).unwrap();
        engine.submit([Edit::ClearStart].into_iter().collect());
        engine.submit([Edit::Block(Cell::new(5, 0))].into_iter().collect());
        assert!(engine.advance(&mut NoOpObserver).is_err());
        assert_eq!(
            engine.advance(&mut NoOpObserver).unwrap(),
            Progress::Finished(Outcome::Failed(FailureReason::GoalUnreachableConfigChanged))
        );
    }

    #[test]
    fn cell_blocked_after_expansion_is_reported_on_path() {
        let g = grid(3, 1, Cell::new(0, 0), Cell::new(0, 2));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.advance(&mut NoOpObserver).unwrap();
        engine.advance(&mut NoOpObserver).unwrap();
        assert!(engine.is_visited(Cell::new(0, 1)));
        assert!(engine.blocked_path_cells().is_empty());

        engine.submit([Edit::Block(Cell::new(0, 1))].into_iter().collect());
        let outcome = engine.run_to_completion(&mut NoOpObserver).unwrap();
        assert!(outcome.is_success());
        assert_eq!(engine.blocked_path_cells(), vec![Cell::new(0, 1)]);
    }

    #[test]
    fn cell_blocked_while_queued_is_never_expanded() {
        let g = grid(5, 1, Cell::new(0, 0), Cell::new(0, 4));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.advance(&mut NoOpObserver).unwrap();
        engine.advance(&mut NoOpObserver).unwrap();
        assert!(engine.frontier_contains(Cell::new(0, 2)));

        engine.submit([Edit::Block(Cell::new(0, 2))].into_iter().collect());
        let progress = engine.advance(&mut NoOpObserver).unwrap();
        assert_eq!(
            progress,
            Progress::Finished(Outcome::Failed(FailureReason::NoPathExists))
        );
        assert_eq!(engine.g_cost(Cell::new(0, 2)), None);
        assert!(!engine.is_visited(Cell::new(0, 2)));
    }

    #[test]
    fn unblocked_cell_can_be_rediscovered() {
        let g = grid(3, 3, Cell::new(0, 0), Cell::new(2, 2));
        let mut engine = SearchEngine::new(&g, SearchStrategy::BreadthFirst).unwrap();
        engine.advance(&mut NoOpObserver).unwrap();

        engine.submit([Edit::Block(Cell::new(0, 1))].into_iter().collect());
        engine.advance(&mut NoOpObserver).unwrap();
        // Pops (0,1) while blocked and drops it, then expands (2,0).
        let Progress::Stepped(event) = engine.advance(&mut NoOpObserver).unwrap() else {
            panic!("expected a step");
        };
        assert_eq!(event.expanded, Cell::new(2, 0));
        assert_eq!(engine.g_cost(Cell::new(0, 1)), None);

        engine.submit([Edit::Unblock(Cell::new(0, 1))].into_iter().collect());
        let Progress::Stepped(event) = engine.advance(&mut NoOpObserver).unwrap() else {
            panic!("expected a step");
        };
        assert_eq!(event.expanded, Cell::new(1, 1));
        assert_eq!(event.newly_discovered, vec![Cell::new(0, 1), Cell::new(1, 2)]);
        assert_eq!(engine.g_cost(Cell::new(0, 1)), Some(3));
        assert_eq!(engine.predecessor(Cell::new(0, 1)), Some(Cell::new(1, 1)));
    }
}
