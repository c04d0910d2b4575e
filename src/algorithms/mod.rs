pub mod common;
pub mod engine;
pub mod frontier;
pub mod path;
pub mod reference;
