//! Pipeline composition and execution for differential abundance analysis.

mod runner;

pub use runner::{run_differential, Pipeline, PipelineConfig};
