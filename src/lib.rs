//! Population Projection - cohort-survival demographic model
//!
//! This library provides:
//! - Year-by-year age/sex cohort projection with births, survival,
//!   top-bucket absorption, and net migration redistribution
//! - Exponential-decay extrapolation of per-age mortality series with fit
//!   diagnostics
//! - CSV loaders for census snapshots, mortality tables, and demographic
//!   rate tables
//! - Multi-scenario batch running over pre-loaded assumptions

pub mod assumptions;
pub mod error;
pub mod extrapolation;
pub mod population;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{Assumptions, MortalityTable, RateTable};
pub use error::ModelError;
pub use extrapolation::{FitResult, MortalityExtrapolator, MortalityForecast};
pub use population::{load_initial_population, PopulationSnapshot, Sex};
pub use projection::{PopulationTimeSeries, ProjectionConfig, ProjectionEngine};
pub use scenario::ScenarioRunner;
