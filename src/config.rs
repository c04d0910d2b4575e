use crate::algorithms::common::SearchStrategy;
use crate::grid::Cell;
use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyChoice {
    /// Breadth-first search
    Bfs,
    /// A* with Manhattan distance
    Astar,
    /// Both, on the same environment
    All,
}

impl StrategyChoice {
    pub fn strategies(self) -> Vec<SearchStrategy> {
        match self {
            StrategyChoice::Bfs => vec![SearchStrategy::BreadthFirst],
            StrategyChoice::Astar => vec![SearchStrategy::BestFirst],
            StrategyChoice::All => SearchStrategy::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Step-by-step grid pathfinding with live obstacles", long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = StrategyChoice::Astar)]
    pub strategy: StrategyChoice,

    /// Start cell as ROW,COL (random when omitted)
    #[arg(long)]
    pub start: Option<Cell>,

    /// Goal cell as ROW,COL (random when omitted)
    #[arg(long)]
    pub goal: Option<Cell>,

    #[arg(long, default_value_t = 60)]
    pub num_walls: usize,

    /// Cells blocked per obstacle wave while searching
    #[arg(long, default_value_t = 3)]
    pub num_obstacles: usize,

    /// Steps between obstacle waves (0 disables them)
    #[arg(long, default_value_t = 5)]
    pub obstacle_interval: usize,

    /// Steps an obstacle wave stays before it is lifted
    #[arg(long, default_value_t = 10)]
    pub obstacle_persistence: usize,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Run this many seeded environments and write a CSV report
    #[arg(long)]
    pub batch: Option<usize>,

    #[arg(long, default_value = "results.csv")]
    pub output: String,

    /// Tracing filter, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Config {
    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }
}
