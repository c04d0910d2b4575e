use crate::algorithms::engine::Outcome;
use crate::grid::Cell;

/// What one expansion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEvent {
    /// Neighbors pushed onto the frontier during this step.
    pub newly_discovered: Vec<Cell>,
    /// The cell that finished expansion.
    pub expanded: Cell,
    /// 1-based count of expansions in this run.
    pub step_count: usize,
    /// Best known cost from start to `expanded`.
    pub running_cost: u32,
    /// Frontier priority `expanded` was popped with (cost plus estimate).
    pub priority: u32,
}

/// Receives engine output after every step. Both hooks default to no-ops.
pub trait StepObserver {
    fn on_step(&mut self, _event: &StepEvent) {}
    fn on_finished(&mut self, _outcome: &Outcome) {}
}

pub struct NoOpObserver;
impl StepObserver for NoOpObserver {}

/// Records every event, for replay and assertions.
#[derive(Debug, Default, Clone)]
pub struct StepLog {
    pub steps: Vec<StepEvent>,
    pub outcome: Option<Outcome>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Vec<Cell> {
        self.steps.iter().map(|s| s.expanded).collect()
    }

    pub fn discovered_count(&self) -> usize {
        self.steps.iter().map(|s| s.newly_discovered.len()).sum()
    }
}

impl StepObserver for StepLog {
    fn on_step(&mut self, event: &StepEvent) {
        self.steps.push(event.clone());
    }

    fn on_finished(&mut self, outcome: &Outcome) {
        self.outcome = Some(outcome.clone());
    }
}

impl<T: StepObserver + ?Sized> StepObserver for &mut T {
    fn on_step(&mut self, event: &StepEvent) {
        (**self).on_step(event);
    }

    fn on_finished(&mut self, outcome: &Outcome) {
        (**self).on_finished(outcome);
    }
}

impl<A: StepObserver, B: StepObserver> StepObserver for (A, B) {
    fn on_step(&mut self, event: &StepEvent) {
        self.0.on_step(event);
        self.1.on_step(event);
    }

    fn on_finished(&mut self, outcome: &Outcome) {
        self.0.on_finished(outcome);
        self.1.on_finished(outcome);
    }
}
