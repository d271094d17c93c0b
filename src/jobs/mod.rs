//! Background jobs: the analysis queue worker and the weekly scheduler.

pub mod analysis_worker;
pub mod scheduler;

pub use analysis_worker::{AnalysisTask, run_analysis_worker};
