//! Projection assumptions: mortality tables and per-year demographic rates

mod mortality;
mod rates;
pub mod loader;

pub use mortality::MortalityTable;
pub use rates::RateTable;

use std::path::Path;

use crate::error::ModelError;

/// Container for all projection assumptions
#[derive(Debug, Clone)]
pub struct Assumptions {
    /// Observed mortality over the historical year range
    pub historical_mortality: MortalityTable,
    /// Extrapolated mortality covering the projection horizon
    pub predicted_mortality: MortalityTable,
    pub birth_rates: RateTable,
    pub migration_rates: RateTable,
}

impl Assumptions {
    /// Load all assumption tables from CSV files in a directory.
    ///
    /// Historical mortality is validated strictly against [0, 1];
    /// out-of-range values in the predicted tables are logged but kept (the
    /// extrapolation may drift at extreme ages).
    pub fn from_csv_path(path: &Path, top_age: usize) -> Result<Self, ModelError> {
        let historical_mortality = loader::load_mortality_table(
            path,
            loader::FEMALE_MORTALITY_FILE,
            loader::MALE_MORTALITY_FILE,
            top_age,
        )?;
        historical_mortality.validate_bounds()?;

        let predicted_mortality = loader::load_mortality_table(
            path,
            loader::FEMALE_PREDICTED_FILE,
            loader::MALE_PREDICTED_FILE,
            top_age,
        )?;
        let flagged = predicted_mortality.warn_out_of_bounds();
        if flagged > 0 {
            log::warn!("{flagged} predicted mortality values fall outside [0, 1]");
        }

        Ok(Self {
            historical_mortality,
            predicted_mortality,
            birth_rates: loader::load_rate_table(&path.join(loader::BIRTH_RATES_FILE), "birth")?,
            migration_rates: loader::load_rate_table(
                &path.join(loader::MIGRATION_RATES_FILE),
                "net migration",
            )?,
        })
    }
}
