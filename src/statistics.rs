use crate::algorithms::common::SearchStrategy;
use crate::algorithms::engine::Outcome;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub strategy: SearchStrategy,
    pub steps: usize,
    pub discovered: usize,
    pub edit_batches: usize,
    pub path_length: Option<usize>,
    pub path_cost: Option<u32>,
    /// Optimal cost on the final grid, from the reference search.
    pub reference_cost: Option<u32>,
    pub timing: TimingData,
}

impl RunStatistics {
    pub fn new(strategy: SearchStrategy) -> Self {
        RunStatistics {
            strategy,
            steps: 0,
            discovered: 0,
            edit_batches: 0,
            path_length: None,
            path_cost: None,
            reference_cost: None,
            timing: TimingData::new(),
        }
    }

    pub fn record_outcome(&mut self, outcome: &Outcome) {
        if let Outcome::Succeeded { path, cost } = outcome {
            self.path_length = Some(path.len());
            self.path_cost = Some(*cost);
        }
    }

    /// Path cost over the reference optimum. 1.0 means optimal.
    pub fn route_efficiency(&self) -> Option<f64> {
        match (self.path_cost, self.reference_cost) {
            (Some(cost), Some(best)) if best > 0 => Some(cost as f64 / best as f64),
            (Some(0), Some(0)) => Some(1.0),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy: {}", self.strategy)?;
        writeln!(f, "Expansions: {}", self.steps)?;
        writeln!(f, "Cells discovered: {}", self.discovered)?;
        writeln!(f, "Edit batches applied: {}", self.edit_batches)?;
        match (self.path_length, self.path_cost) {
            (Some(len), Some(cost)) => writeln!(f, "Path: {len} cells, cost {cost}")?,
            _ => writeln!(f, "Path: none")?,
        }
        match self.reference_cost {
            Some(best) => writeln!(f, "Optimal cost on final grid: {best}")?,
            None => writeln!(f, "Optimal cost on final grid: unreachable")?,
        }
        if let Some(efficiency) = self.route_efficiency() {
            writeln!(f, "Route efficiency: {efficiency:.3}")?;
            if efficiency > 1.0 {
                writeln!(f, "Note: obstacles changed while searching, path was planned on an earlier grid")?;
            }
        }
        writeln!(f, "Average step time: {:.2?}", self.timing.average_step_time())?;
        writeln!(f, "Total step time: {:.2?}", self.timing.total_step_time())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimingData {
    pub step_times: Vec<Duration>,
}

impl TimingData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn average_step_time(&self) -> Duration {
        if self.step_times.is_empty() {
            Duration::from_nanos(0)
        } else {
            self.total_step_time() / self.step_times.len() as u32
        }
    }

    pub fn total_step_time(&self) -> Duration {
        self.step_times.iter().sum()
    }

    pub fn total_calls(&self) -> usize {
        self.step_times.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn efficiency_compares_against_reference() {
        let mut stats = RunStatistics::new(SearchStrategy::BestFirst);
        assert_eq!(stats.route_efficiency(), None);

        stats.record_outcome(&Outcome::Succeeded {
            path: vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)],
            cost: 2,
        });
        stats.reference_cost = Some(2);
        assert_eq!(stats.path_length, Some(3));
        assert_eq!(stats.route_efficiency(), Some(1.0));

        stats.reference_cost = Some(0);
        assert_eq!(stats.route_efficiency(), None);
    }

    #[test]
    fn timing_averages() {
        let timing = TimingData {
            step_times: vec![Duration::from_micros(10), Duration::from_micros(30)],
        };
        assert_eq!(timing.average_step_time(), Duration::from_micros(20));
        assert_eq!(timing.total_calls(), 2);
        assert_eq!(TimingData::new().average_step_time(), Duration::ZERO);
    }
}
