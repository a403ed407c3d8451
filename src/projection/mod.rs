//! Cohort projection engine and its outputs

mod engine;
mod series;

pub use engine::{
    ProjectionConfig, ProjectionEngine, DEFAULT_END_YEAR, DEFAULT_MIGRATION_MAX_AGE,
    DEFAULT_MORTALITY_CUTOVER_YEAR, DEFAULT_START_YEAR, DEFAULT_TOP_AGE,
};
pub use series::{PopulationTimeSeries, ProjectionSummary};
