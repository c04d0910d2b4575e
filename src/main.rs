use clap::Parser;

use grid_pathfinder::batch_simulation::BatchSimulation;
use grid_pathfinder::config::Config;
use grid_pathfinder::Outcome;
use grid_pathfinder::simulation::{Environment, Simulation};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let seed = config.seed.unwrap_or_else(rand::random);

    if !config.quiet {
        println!("Starting pathfinding run...");
        println!("Grid size: {}x{}", config.width, config.height);
        println!(
            "Walls: {}, Obstacles per wave: {} every {} steps",
            config.num_walls, config.num_obstacles, config.obstacle_interval
        );
        println!("Strategy: {:?}", config.strategy);
        println!("Seed: {seed} (pass --seed to replay)");
        println!();
    }

    if let Some(runs) = config.batch {
        let mut batch = BatchSimulation::new(config.clone(), runs, seed);
        match batch.run() {
            Ok(()) => {
                if !config.quiet {
                    batch.print_summary();
                }
            }
            Err(e) => {
                eprintln!("Batch run failed: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let environment = match Environment::generate(&config, seed) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Could not build the environment: {e}");
            std::process::exit(1);
        }
    };

    let frame_delay = (!config.no_visualization).then(|| Duration::from_millis(config.delay_ms));
    let strategies = config.strategy.strategies();

    match Simulation::run_all(&environment, &strategies, frame_delay) {
        Ok(reports) if reports.len() > 1 => Simulation::print_comparison_results(&reports),
        Ok(reports) => {
            for report in reports {
                println!("\n=== FINAL RESULTS ===");
                match &report.outcome {
                    Outcome::Succeeded { path, .. } => {
                        let cells: Vec<String> = path.iter().map(ToString::to_string).collect();
                        println!("Path: {}", cells.join(" -> "));
                    }
                    Outcome::Failed(reason) => println!("FAILED: {reason}"),
                }
                println!("{}", report.statistics);
            }
        }
        Err(e) => {
            eprintln!("Search failed: {e}");
            std::process::exit(1);
        }
    }
}
