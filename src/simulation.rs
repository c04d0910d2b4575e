use crate::algorithms::common::SearchStrategy;
use crate::algorithms::engine::{Outcome, Progress, SearchEngine};
use crate::algorithms::reference;
use crate::config::Config;
use crate::edits::{InputSource, ObstacleTimeline};
use crate::error::PathfindingError;
use crate::grid::{Cell, GridModel, Occupancy};
use crate::presenter::TextPresenter;
use crate::statistics::RunStatistics;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::{Duration, Instant};

/// A seeded layout: walls, start, goal, and the obstacle waves that will
/// drop while searching. The same seed always yields the same environment.
#[derive(Debug, Clone)]
pub struct Environment {
    pub grid: GridModel,
    pub seed: u64,
    pub timeline: ObstacleTimeline,
}

impl Environment {
    pub fn generate(config: &Config, seed: u64) -> Result<Self, PathfindingError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (width, height) = (config.width(), config.height());
        let mut grid = GridModel::new(width, height)?;

        // Start in the top-left quadrant, goal in the bottom-right one.
        let start = config.start.unwrap_or_else(|| {
            Cell::new(rng.gen_range(0..=(height - 1) / 2), rng.gen_range(0..=(width - 1) / 2))
        });
        let goal = config
            .goal
            .unwrap_or_else(|| Cell::new(rng.gen_range(height / 2..height), rng.gen_range(width / 2..width)));
        grid.designate_start(start)?;
        grid.designate_goal(goal)?;

        let mut walls_placed = 0;
        let mut attempts = 0;
        while walls_placed < config.num_walls && attempts < config.num_walls * 3 {
            attempts += 1;
            let cell = Cell::new(rng.gen_range(0..height), rng.gen_range(0..width));
            if cell == start || cell == goal || grid.is_blocked(cell) {
                continue;
            }
            grid.set_occupancy(cell, Occupancy::Blocked)?;
            walls_placed += 1;
        }

        let timeline = ObstacleTimeline::generate(
            &grid,
            config.num_obstacles,
            config.obstacle_interval,
            config.obstacle_persistence,
            &mut rng,
        );

        tracing::debug!(seed, %start, %goal, walls = walls_placed, waves = timeline.wave_count(), "generated environment");
        Ok(Environment {
            grid,
            seed,
            timeline,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Outcome,
    pub statistics: RunStatistics,
}

/// Drives one engine: drain input, edit the live grid, forward the same
/// batch to the engine, advance one step, render.
pub struct Simulation<I: InputSource> {
    grid: GridModel,
    engine: SearchEngine,
    input: I,
    presenter: TextPresenter,
    statistics: RunStatistics,
    frame_delay: Option<Duration>,
}

impl<I: InputSource> Simulation<I> {
    pub fn new(grid: GridModel, strategy: SearchStrategy, input: I) -> Result<Self, PathfindingError> {
        let engine = SearchEngine::new(&grid, strategy)?;
        Ok(Simulation {
            grid,
            engine,
            input,
            presenter: TextPresenter::new(),
            statistics: RunStatistics::new(strategy),
            frame_delay: None,
        })
    }

    /// Draws a frame after every step and waits `delay` before the next.
    pub fn with_visualization(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn run(&mut self) -> Result<RunReport, PathfindingError> {
        let max_iterations = self.grid.width() * self.grid.height() * 4;

        if let Some(delay) = self.frame_delay {
            self.draw_frame(0);
            thread::sleep(delay);
        }

        for iteration in 0..max_iterations {
            let batch = self.input.drain(iteration);
            if !batch.is_empty() {
                match batch.apply_to(&mut self.grid) {
                    Ok(()) => {
                        self.statistics.edit_batches += 1;
                        self.engine.submit(batch);
                    }
                    Err(err) => tracing::warn!(%err, iteration, "live grid rejected edit batch"),
                }
            }

            let started = Instant::now();
            let progress = self.engine.advance(&mut self.presenter)?;
            self.statistics.timing.step_times.push(started.elapsed());

            if let Some(delay) = self.frame_delay {
                self.draw_frame(iteration + 1);
                thread::sleep(delay);
            }

            if let Progress::Finished(outcome) = progress {
                return Ok(self.report(outcome));
            }
        }

        Err(PathfindingError::invalid_state(format!(
            "search did not finish within {max_iterations} steps"
        )))
    }

    fn draw_frame(&self, iteration: usize) {
        TextPresenter::clear_screen();
        println!("=== PATHFINDING ===");
        println!(
            "Strategy: {} | Iteration: {} | Frontier: {} | Blocked cells: {}",
            self.engine.strategy(),
            iteration,
            self.engine.frontier_len(),
            self.grid.blocked_count()
        );
        print!("{}", self.presenter.render(&self.grid));
    }

    fn report(&mut self, outcome: Outcome) -> RunReport {
        let mut statistics = self.statistics.clone();
        statistics.steps = self.engine.steps();
        statistics.discovered = self.presenter.discovered_count();
        statistics.reference_cost = reference::optimal_cost(&self.grid);
        statistics.record_outcome(&outcome);
        RunReport {
            outcome,
            statistics,
        }
    }
}

impl Simulation<ObstacleTimeline> {
    /// Runs each strategy on its own copy of the same environment.
    pub fn run_all(
        environment: &Environment,
        strategies: &[SearchStrategy],
        frame_delay: Option<Duration>,
    ) -> Result<Vec<RunReport>, PathfindingError> {
        let mut reports = Vec::with_capacity(strategies.len());
        for &strategy in strategies {
            let mut simulation =
                Simulation::new(environment.grid.clone(), strategy, environment.timeline.clone())?;
            if let Some(delay) = frame_delay {
                simulation = simulation.with_visualization(delay);
            }
            reports.push(simulation.run()?);
        }
        Ok(reports)
    }

    pub fn print_comparison_results(reports: &[RunReport]) {
        println!("\n=== STRATEGY COMPARISON ===");
        println!(
            "{:<10} {:<8} {:<8} {:<12} {:<8} {:<10} {:<12} {:<15}",
            "Strategy", "Success", "Steps", "Discovered", "Cost", "Optimal", "Efficiency", "Avg Step"
        );
        println!("{}", "-".repeat(88));

        for report in reports {
            let stats = &report.statistics;
            let success = if report.outcome.is_success() { "yes" } else { "no" };
            let cost = stats.path_cost.map_or("-".to_string(), |c| c.to_string());
            let optimal = stats.reference_cost.map_or("-".to_string(), |c| c.to_string());
            let efficiency = stats
                .route_efficiency()
                .map_or("-".to_string(), |e| format!("{e:.3}"));
            println!(
                "{:<10} {:<8} {:<8} {:<12} {:<8} {:<10} {:<12} {:<15}",
                stats.strategy.name(),
                success,
                stats.steps,
                stats.discovered,
                cost,
                optimal,
                efficiency,
                format!("{:.2?}", stats.timing.average_step_time()),
            );
        }

        let fewest = reports
            .iter()
            .filter(|r| r.outcome.is_success())
            .min_by_key(|r| r.statistics.steps);
        if let Some(best) = fewest {
            println!(
                "\nFewest expansions: {} ({} steps)",
                best.statistics.strategy, best.statistics.steps
            );
        } else {
            println!("\nNo strategy reached the goal.");
        }
    }
}
