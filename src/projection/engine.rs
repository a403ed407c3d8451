//! Core projection engine: year-by-year cohort survival with births and
//! migration
//!
//! Each step is a pure function of the previous year's snapshot and that
//! year's rates; the engine holds no state beyond its immutable inputs, and
//! the growing time series is owned by the caller of `project_year` or
//! built up by `run`.

use crate::assumptions::{Assumptions, MortalityTable};
use crate::error::ModelError;
use crate::population::{PopulationSnapshot, Sex};

use super::series::PopulationTimeSeries;

/// Default projection start year (the census snapshot's year)
pub const DEFAULT_START_YEAR: u32 = 1991;

/// Default projection end year (inclusive)
pub const DEFAULT_END_YEAR: u32 = 2100;

/// First year advanced with extrapolated rather than historical mortality
pub const DEFAULT_MORTALITY_CUTOVER_YEAR: u32 = 2020;

/// Index of the closed top age bucket ("100+")
pub const DEFAULT_TOP_AGE: usize = 100;

/// Oldest age receiving a share of net migration
pub const DEFAULT_MIGRATION_MAX_AGE: usize = 70;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// First simulated year; the initial snapshot must carry this year
    pub start_year: u32,

    /// Last simulated year (inclusive)
    pub end_year: u32,

    /// From this year on, steps read the predicted mortality table instead
    /// of the historical one. A fixed constant, not derived from data
    /// availability.
    pub mortality_cutover_year: u32,

    /// Index of the open-ended top age bucket
    pub top_age: usize,

    /// Net migration is spread evenly across ages 0..=migration_max_age.
    /// Independent of `top_age`: reconfiguring the top bucket does not move
    /// this window.
    pub migration_max_age: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            mortality_cutover_year: DEFAULT_MORTALITY_CUTOVER_YEAR,
            top_age: DEFAULT_TOP_AGE,
            migration_max_age: DEFAULT_MIGRATION_MAX_AGE,
        }
    }
}

impl ProjectionConfig {
    /// Check the boundary constants for mutual consistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.start_year >= self.end_year {
            return Err(ModelError::InputShape(format!(
                "start year {} is not before end year {}",
                self.start_year, self.end_year
            )));
        }
        if self.mortality_cutover_year <= self.start_year {
            return Err(ModelError::InputShape(format!(
                "mortality cutover {} is not after start year {}",
                self.mortality_cutover_year, self.start_year
            )));
        }
        // The top two bands are special-cased, so the range must hold at
        // least ages 0, top-1, and top.
        if self.top_age < 2 {
            return Err(ModelError::InputShape(format!(
                "top age bucket {} leaves no room for the age structure",
                self.top_age
            )));
        }
        if self.migration_max_age > self.top_age {
            return Err(ModelError::InputShape(format!(
                "migration window 0-{} extends past the top age bucket {}",
                self.migration_max_age, self.top_age
            )));
        }
        Ok(())
    }

    /// Number of simulated steps.
    pub fn steps(&self) -> u32 {
        self.end_year - self.start_year
    }
}

/// Main projection engine
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create an engine, validating the configuration and that every input
    /// table covers the simulated horizon.
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Self::validate_coverage(&assumptions, &config)?;
        Ok(Self {
            assumptions,
            config,
        })
    }

    /// A step for year Y reads mortality observed at Y-1: the historical
    /// table while Y is before the cutover, the predicted table from the
    /// cutover year on. Every table must cover its share of the horizon
    /// before the run starts.
    fn validate_coverage(
        assumptions: &Assumptions,
        config: &ProjectionConfig,
    ) -> Result<(), ModelError> {
        for table in [
            &assumptions.historical_mortality,
            &assumptions.predicted_mortality,
        ] {
            if table.max_age() != config.top_age {
                return Err(ModelError::InputShape(format!(
                    "mortality table top bucket {} does not match configured top age {}",
                    table.max_age(),
                    config.top_age
                )));
            }
        }

        let last_historical_step = config.end_year.min(config.mortality_cutover_year - 1);
        if config.start_year < last_historical_step
            && !assumptions
                .historical_mortality
                .covers_range(config.start_year, last_historical_step - 1)
        {
            return Err(ModelError::InputShape(format!(
                "historical mortality covers {}-{}, projection needs {}-{}",
                assumptions.historical_mortality.first_year(),
                assumptions.historical_mortality.last_year(),
                config.start_year,
                last_historical_step - 1
            )));
        }
        if config.end_year >= config.mortality_cutover_year
            && !assumptions
                .predicted_mortality
                .covers_range(config.mortality_cutover_year - 1, config.end_year - 1)
        {
            return Err(ModelError::InputShape(format!(
                "predicted mortality covers {}-{}, projection needs {}-{}",
                assumptions.predicted_mortality.first_year(),
                assumptions.predicted_mortality.last_year(),
                config.mortality_cutover_year - 1,
                config.end_year - 1
            )));
        }

        for rates in [&assumptions.birth_rates, &assumptions.migration_rates] {
            if !rates.covers_range(config.start_year + 1, config.end_year) {
                return Err(ModelError::InputShape(format!(
                    "{} rates cover {}-{}, projection needs {}-{}",
                    rates.name(),
                    rates.first_year(),
                    rates.last_year(),
                    config.start_year + 1,
                    config.end_year
                )));
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    fn mortality_for_step(&self, year: u32) -> &MortalityTable {
        if year < self.config.mortality_cutover_year {
            &self.assumptions.historical_mortality
        } else {
            &self.assumptions.predicted_mortality
        }
    }

    /// Advance a snapshot by a single year.
    ///
    /// Pure: the same previous snapshot and rates always produce the same
    /// new snapshot, and the input is never modified.
    pub fn project_year(
        &self,
        prev: &PopulationSnapshot,
    ) -> Result<PopulationSnapshot, ModelError> {
        if prev.top_age() != self.config.top_age {
            return Err(ModelError::InputShape(format!(
                "snapshot top bucket {} does not match configured top age {}",
                prev.top_age(),
                self.config.top_age
            )));
        }

        let year = prev.year() + 1;
        let mortality = self.mortality_for_step(year);
        let birth_rate = self.assumptions.birth_rates.get(year)?;
        let migration_rate = self.assumptions.migration_rates.get(year)?;
        let prev_total = prev.total();

        let male = self.advance_sex(prev, Sex::Male, mortality, prev_total, birth_rate, migration_rate)?;
        let female =
            self.advance_sex(prev, Sex::Female, mortality, prev_total, birth_rate, migration_rate)?;
        PopulationSnapshot::new(year, male, female)
    }

    /// One sex's new age structure. The sexes are independent within a step
    /// and share only the previous year's combined total.
    fn advance_sex(
        &self,
        prev: &PopulationSnapshot,
        sex: Sex,
        mortality: &MortalityTable,
        prev_total: f64,
        birth_rate: f64,
        migration_rate: f64,
    ) -> Result<Vec<f64>, ModelError> {
        let top = self.config.top_age;
        let prior_year = prev.year();
        let counts = prev.counts(sex);
        let mut next = Vec::with_capacity(top + 1);

        // Births, split evenly between the sexes.
        next.push(0.5 * prev_total * birth_rate);

        // Shift-and-survive: each band ages one year, discounted by the
        // younger band's survival probability.
        for age in 1..top {
            let survival = mortality.survival_probability(age - 1, sex, prior_year)?;
            next.push(counts[age - 1] * survival);
        }

        // The top bucket keeps its own survivors and absorbs survivors
        // aging in from the band below; it is never vacated.
        let survival_top = mortality.survival_probability(top, sex, prior_year)?;
        let survival_below = mortality.survival_probability(top - 1, sex, prior_year)?;
        next.push(counts[top] * survival_top + counts[top - 1] * survival_below);

        // Net migration, spread evenly across the migration window.
        let migrants = 0.5 * prev_total * migration_rate;
        let share = migrants / (self.config.migration_max_age + 1) as f64;
        for band in next.iter_mut().take(self.config.migration_max_age + 1) {
            *band += share;
        }

        Ok(next)
    }

    /// Run the full horizon from the initial snapshot, appending one
    /// snapshot per simulated year. No early termination: the loop always
    /// covers `end_year - start_year` steps.
    pub fn run(&self, initial: PopulationSnapshot) -> Result<PopulationTimeSeries, ModelError> {
        if initial.year() != self.config.start_year {
            return Err(ModelError::InputShape(format!(
                "initial snapshot is for {}, configured start year is {}",
                initial.year(),
                self.config.start_year
            )));
        }

        let mut series = PopulationTimeSeries::new(initial);
        for _ in 0..self.config.steps() {
            let next = self.project_year(series.latest())?;
            log::debug!(
                "projected year {}: total population {:.0}",
                next.year(),
                next.total()
            );
            series.push(next);
        }
        Ok(series)
    }
}
