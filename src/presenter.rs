use crate::algorithms::engine::Outcome;
use crate::grid::{Cell, CellView, GridModel};
use crate::observer::{StepEvent, StepObserver};
use rustc_hash::FxHashSet;
use std::fmt::Write;

/// ASCII presenter. Keeps its own view of the search built from step
/// events and draws it over whatever grid it is handed.
#[derive(Debug, Default)]
pub struct TextPresenter {
    discovered: FxHashSet<Cell>,
    expanded: FxHashSet<Cell>,
    path: Vec<Cell>,
    last: Option<StepEvent>,
    outcome: Option<Outcome>,
}

impl TextPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_step(&self) -> Option<&StepEvent> {
        self.last.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    fn glyph(&self, grid: &GridModel, cell: Cell) -> char {
        match grid.query(cell) {
            Ok(CellView::Start) => 'S',
            Ok(CellView::Goal) => 'G',
            Ok(CellView::Blocked) | Err(_) => '#',
            Ok(CellView::Free) => {
                if self.path.contains(&cell) {
                    '*'
                } else if self.expanded.contains(&cell) {
                    'x'
                } else if self.discovered.contains(&cell) {
                    'o'
                } else {
                    '.'
                }
            }
        }
    }

    /// One frame: legend, column header, rows, and a status line.
    pub fn render(&self, grid: &GridModel) -> String {
        let mut out = String::new();
        out.push_str("Legend: S=Start, G=Goal, #=Blocked, *=Path, x=Expanded, o=Frontier, .=Free\n");

        out.push_str("   ");
        for col in 0..grid.width() {
            let _ = write!(out, "{:2}", col % 10);
        }
        out.push('\n');

        for row in 0..grid.height() {
            let _ = write!(out, "{row:2} ");
            for col in 0..grid.width() {
                let _ = write!(out, "{} ", self.glyph(grid, Cell::new(row, col)));
            }
            out.push('\n');
        }

        match (&self.outcome, &self.last) {
            (Some(Outcome::Succeeded { path, cost }), _) => {
                let _ = writeln!(out, "Path found: {} cells, cost {cost}", path.len());
            }
            (Some(Outcome::Failed(reason)), _) => {
                let _ = writeln!(out, "Search failed: {reason}");
            }
            (None, Some(step)) => {
                let _ = writeln!(
                    out,
                    "Steps: {} | Cost: {} | Expanded: {}",
                    step.step_count, step.running_cost, step.expanded
                );
            }
            (None, None) => out.push_str("Steps: 0\n"),
        }
        out
    }

    /// Clears the terminal before the next frame.
    pub fn clear_screen() {
        print!("\x1B[2J\x1B[1;1H");
    }
}

impl StepObserver for TextPresenter {
    fn on_step(&mut self, event: &StepEvent) {
        self.discovered.extend(event.newly_discovered.iter().copied());
        self.expanded.insert(event.expanded);
        self.last = Some(event.clone());
    }

    fn on_finished(&mut self, outcome: &Outcome) {
        if let Outcome::Succeeded { path, .. } = outcome {
            self.path = path.clone();
        }
        self.outcome = Some(outcome.clone());
    }
}
