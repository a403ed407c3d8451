//! Error taxonomy for the projection pipeline
//!
//! All variants are unrecoverable at the point of detection: a failed load,
//! fit, or rate lookup aborts the run before any output artifact is written.

use thiserror::Error;

use crate::population::Sex;

/// Errors raised while loading inputs, fitting mortality curves, or running
/// a projection.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An input table is missing required years/ages or has inconsistent
    /// bucket boundaries.
    #[error("input shape error: {0}")]
    InputShape(String),

    /// The nonlinear curve fit failed to converge for one age band. Fatal
    /// for the whole extrapolation run: a corrupted prediction for a single
    /// age would silently propagate through every downstream projection.
    #[error("mortality curve fit failed for {sex} age {age}: {reason}")]
    FitConvergence {
        sex: Sex,
        age: usize,
        reason: String,
    },

    /// A projection step requested a year absent from a rate table.
    /// Defaulting to zero would misrepresent population dynamics, so this
    /// aborts the run instead.
    #[error("no {table} rate available for year {year}")]
    MissingRate { table: &'static str, year: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV field failed to parse as the expected type.
    #[error("failed to parse {field} value '{value}'")]
    Parse { field: &'static str, value: String },
}
