//! Grid edit events and the input sources that produce them.
//!
//! Edits are grouped into an [`ObstacleEditBatch`] which is applied to a
//! grid all-or-nothing. The driving loop drains one batch per search step
//! from an [`InputSource`] and hands it to both the live grid and the
//! engine.

use crate::error::PathfindingError;
use crate::grid::{Cell, GridModel, Occupancy};
use rand::Rng;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edit {
    Block(Cell),
    Unblock(Cell),
    SetStart(Cell),
    ClearStart,
    SetGoal(Cell),
    ClearGoal,
}

impl Edit {
    fn apply(self, grid: &mut GridModel) -> Result<(), PathfindingError> {
        match self {
            Edit::Block(cell) => grid.set_occupancy(cell, Occupancy::Blocked).map(drop),
            Edit::Unblock(cell) => grid.set_occupancy(cell, Occupancy::Free).map(drop),
            Edit::SetStart(cell) => grid.designate_start(cell),
            Edit::ClearStart => {
                grid.clear_start();
                Ok(())
            }
            Edit::SetGoal(cell) => grid.designate_goal(cell),
            Edit::ClearGoal => {
                grid.clear_goal();
                Ok(())
            }
        }
    }
}

/// An ordered set of edits applied atomically between search steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleEditBatch {
    edits: Vec<Edit>,
}

impl ObstacleEditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Appends `other` after this batch's edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }

    /// Applies every edit in order. If any edit fails, `grid` is left
    /// exactly as it was.
    pub fn apply_to(&self, grid: &mut GridModel) -> Result<(), PathfindingError> {
        if self.edits.is_empty() {
            return Ok(());
        }
        let mut staged = grid.clone();
        for edit in &self.edits {
            edit.apply(&mut staged)?;
        }
        *grid = staged;
        Ok(())
    }
}

impl FromIterator<Edit> for ObstacleEditBatch {
    fn from_iter<I: IntoIterator<Item = Edit>>(iter: I) -> Self {
        ObstacleEditBatch {
            edits: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ObstacleEditBatch {
    type Item = Edit;
    type IntoIter = std::vec::IntoIter<Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.into_iter()
    }
}

/// Produces the edits to apply before a given step.
pub trait InputSource {
    /// Returns everything queued for `step` (the number of `advance()`
    /// calls made so far) that has not been drained yet.
    fn drain(&mut self, step: usize) -> ObstacleEditBatch;
}

/// Edits scheduled at fixed step numbers.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<(usize, Edit)>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `edit` for `step`. Edits sharing a step keep the order
    /// they were scheduled in.
    pub fn schedule(&mut self, step: usize, edit: Edit) {
        let pos = self.queue.partition_point(|&(s, _)| s <= step);
        self.queue.insert(pos, (step, edit));
    }

    pub fn at(mut self, step: usize, edit: Edit) -> Self {
        self.schedule(step, edit);
        self
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn drain(&mut self, step: usize) -> ObstacleEditBatch {
        let mut batch = ObstacleEditBatch::new();
        while let Some(&(due, edit)) = self.queue.front() {
            if due > step {
                break;
            }
            batch.push(edit);
            self.queue.pop_front();
        }
        batch
    }
}

#[derive(Debug, Clone)]
struct Wave {
    placed_at: usize,
    lifted_at: usize,
    cells: Vec<Cell>,
}

/// Pre-generated waves of temporary obstacles dropped while a search runs.
///
/// Every `interval` steps a wave of up to `num_obstacles` free cells is
/// blocked, and each wave is unblocked again `persistence` steps later.
/// Cells are drawn only from free, undesignated cells that no other live
/// wave holds, so lifting a wave never clears a wall or another wave.
#[derive(Debug, Clone)]
pub struct ObstacleTimeline {
    script: ScriptedInput,
    waves: usize,
}

impl ObstacleTimeline {
    pub fn generate<R: Rng>(
        grid: &GridModel,
        num_obstacles: usize,
        interval: usize,
        persistence: usize,
        rng: &mut R,
    ) -> Self {
        let mut script = ScriptedInput::new();
        if interval == 0 || num_obstacles == 0 {
            return ObstacleTimeline { script, waves: 0 };
        }

        let max_steps = grid.width() * grid.height();
        let mut waves: Vec<Wave> = Vec::new();

        for n in 1..=max_steps / interval {
            let placed_at = n * interval;
            let held: FxHashSet<Cell> = waves
                .iter()
                .filter(|w| w.lifted_at > placed_at)
                .flat_map(|w| w.cells.iter().copied())
                .collect();

            let mut cells = Vec::new();
            let mut attempts = 0;
            while cells.len() < num_obstacles && attempts < num_obstacles * 10 {
                attempts += 1;
                let cell = Cell::new(
                    rng.gen_range(0..grid.height()),
                    rng.gen_range(0..grid.width()),
                );
                if grid.start() == Some(cell)
                    || grid.goal() == Some(cell)
                    || grid.is_blocked(cell)
                    || held.contains(&cell)
                    || cells.contains(&cell)
                {
                    continue;
                }
                cells.push(cell);
            }

            if !cells.is_empty() {
                waves.push(Wave {
                    placed_at,
                    lifted_at: placed_at + persistence.max(1),
                    cells,
                });
            }
        }

        for wave in &waves {
            for &cell in &wave.cells {
                script.schedule(wave.placed_at, Edit::Block(cell));
                script.schedule(wave.lifted_at, Edit::Unblock(cell));
            }
        }

        tracing::debug!(waves = waves.len(), "generated obstacle timeline");
        ObstacleTimeline {
            script,
            waves: waves.len(),
        }
    }

    pub fn wave_count(&self) -> usize {
        self.waves
    }
}

impl InputSource for ObstacleTimeline {
    fn drain(&mut self, step: usize) -> ObstacleEditBatch {
        self.script.drain(step)
    }
}
