use crate::algorithms::common::SearchStrategy;
use crate::algorithms::engine::Outcome;
use crate::config::Config;
use crate::simulation::{Environment, RunReport, Simulation};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub run_id: usize,
    pub strategy: SearchStrategy,
    pub width: usize,
    pub height: usize,
    pub num_walls: usize,
    pub seed: u64,
    /// `succeeded`, a failure reason, or `error: ...` when setup failed.
    pub outcome: String,
    pub success: bool,
    pub steps: usize,
    pub discovered: usize,
    pub path_cost: Option<u32>,
    pub reference_cost: Option<u32>,
    pub average_step_ns: u64,
}

const CSV_HEADER: &str = "run_id,strategy,width,height,num_walls,seed,outcome,steps,discovered,path_cost,reference_cost,average_step_ns";

impl BatchResult {
    fn csv_row(&self) -> String {
        let opt = |v: Option<u32>| v.map_or(String::new(), |v| v.to_string());
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            self.run_id,
            self.strategy,
            self.width,
            self.height,
            self.num_walls,
            self.seed,
            self.outcome.replace(',', ";"),
            self.steps,
            self.discovered,
            opt(self.path_cost),
            opt(self.reference_cost),
            self.average_step_ns
        )
    }
}

/// Runs many seeded environments per strategy without visualization.
pub struct BatchSimulation {
    config: Config,
    runs: usize,
    base_seed: u64,
    results: Vec<BatchResult>,
}

impl BatchSimulation {
    pub fn new(config: Config, runs: usize, base_seed: u64) -> Self {
        BatchSimulation {
            config,
            runs,
            base_seed,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    /// Runs every environment and writes the CSV report to `--output`.
    pub fn run(&mut self) -> io::Result<()> {
        let started = Instant::now();
        let strategies = self.config.strategy.strategies();
        if !self.config.quiet {
            println!("=== BATCH RUN STARTED ===");
            println!("Grid: {}x{}", self.config.width, self.config.height);
            println!("Runs: {} | Strategies: {:?}", self.runs, strategies);
            println!("Seeds: {}..{}", self.base_seed, self.base_seed.wrapping_add(self.runs as u64));
        }

        for run_id in 0..self.runs {
            let seed = self.base_seed.wrapping_add(run_id as u64);
            let environment = match Environment::generate(&self.config, seed) {
                Ok(env) => env,
                Err(err) => {
                    tracing::warn!(%err, seed, "environment generation failed");
                    for &strategy in &strategies {
                        self.results.push(self.failed_result(run_id, strategy, seed, &err.to_string()));
                    }
                    continue;
                }
            };

            for &strategy in &strategies {
                let result = match Simulation::run_all(&environment, &[strategy], None) {
                    Ok(mut reports) => match reports.pop() {
                        Some(report) => self.to_batch_result(run_id, seed, report),
                        None => self.failed_result(run_id, strategy, seed, "no report"),
                    },
                    Err(err) => self.failed_result(run_id, strategy, seed, &err.to_string()),
                };
                self.results.push(result);
            }
        }

        self.write_csv(&self.config.output)?;
        if !self.config.quiet {
            println!("\n=== BATCH RUN COMPLETED ===");
            println!("Results: {} -> {}", self.results.len(), self.config.output);
            println!("Total time: {:.2?}", started.elapsed());
        }
        Ok(())
    }

    fn to_batch_result(&self, run_id: usize, seed: u64, report: RunReport) -> BatchResult {
        let stats = report.statistics;
        let outcome = match &report.outcome {
            Outcome::Succeeded { .. } => "succeeded".to_string(),
            Outcome::Failed(reason) => reason.to_string(),
        };
        BatchResult {
            run_id,
            strategy: stats.strategy,
            width: self.config.width(),
            height: self.config.height(),
            num_walls: self.config.num_walls,
            seed,
            outcome,
            success: report.outcome.is_success(),
            steps: stats.steps,
            discovered: stats.discovered,
            path_cost: stats.path_cost,
            reference_cost: stats.reference_cost,
            average_step_ns: stats.timing.average_step_time().as_nanos() as u64,
        }
    }

    fn failed_result(&self, run_id: usize, strategy: SearchStrategy, seed: u64, detail: &str) -> BatchResult {
        BatchResult {
            run_id,
            strategy,
            width: self.config.width(),
            height: self.config.height(),
            num_walls: self.config.num_walls,
            seed,
            outcome: format!("error: {detail}"),
            success: false,
            steps: 0,
            discovered: 0,
            path_cost: None,
            reference_cost: None,
            average_step_ns: 0,
        }
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{CSV_HEADER}")?;
        for result in &self.results {
            writeln!(out, "{}", result.csv_row())?;
        }
        out.flush()
    }

    pub fn print_summary(&self) {
        if self.results.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SUMMARY ===");
        let mut groups: FxHashMap<SearchStrategy, Vec<&BatchResult>> = FxHashMap::default();
        for result in &self.results {
            groups.entry(result.strategy).or_default().push(result);
        }

        for strategy in SearchStrategy::ALL {
            let Some(results) = groups.get(&strategy) else {
                continue;
            };
            let successful: Vec<_> = results.iter().filter(|r| r.success).collect();
            let total = results.len();
            println!("\n{strategy}:");
            println!(
                "  Success rate: {}/{} ({:.1}%)",
                successful.len(),
                total,
                successful.len() as f64 / total as f64 * 100.0
            );
            if !successful.is_empty() {
                let n = successful.len() as f64;
                let avg_steps = successful.iter().map(|r| r.steps as f64).sum::<f64>() / n;
                let avg_discovered = successful.iter().map(|r| r.discovered as f64).sum::<f64>() / n;
                println!("  Average expansions: {avg_steps:.1}");
                println!("  Average cells discovered: {avg_discovered:.1}");
            }
        }
    }
}
