//! Scenario runner for batch projections
//!
//! Pre-loads assumptions once, then allows running many projections with
//! different configurations without re-reading CSV files.

use std::path::Path;

use crate::assumptions::Assumptions;
use crate::error::ModelError;
use crate::population::PopulationSnapshot;
use crate::projection::{PopulationTimeSeries, ProjectionConfig, ProjectionEngine};

/// Pre-loaded scenario runner for efficient batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv_path(Path::new("data"), 100)?;
///
/// for cutover in [2020, 2030] {
///     let config = ProjectionConfig { mortality_cutover_year: cutover, ..Default::default() };
///     let series = runner.run(&initial, config)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Pre-loaded base assumptions
    base_assumptions: Assumptions,
}

impl ScenarioRunner {
    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            base_assumptions: assumptions,
        }
    }

    /// Create runner by loading assumptions from a CSV directory
    pub fn from_csv_path(path: &Path, top_age: usize) -> Result<Self, ModelError> {
        Ok(Self {
            base_assumptions: Assumptions::from_csv_path(path, top_age)?,
        })
    }

    /// Run a single projection with the given config
    pub fn run(
        &self,
        initial: &PopulationSnapshot,
        config: ProjectionConfig,
    ) -> Result<PopulationTimeSeries, ModelError> {
        let engine = ProjectionEngine::new(self.base_assumptions.clone(), config)?;
        engine.run(initial.clone())
    }

    /// Run multiple scenarios (different configs) from the same initial
    /// snapshot
    pub fn run_scenarios(
        &self,
        initial: &PopulationSnapshot,
        configs: &[ProjectionConfig],
    ) -> Result<Vec<PopulationTimeSeries>, ModelError> {
        configs
            .iter()
            .map(|config| self.run(initial, config.clone()))
            .collect()
    }

    /// Get reference to base assumptions for inspection
    pub fn assumptions(&self) -> &Assumptions {
        &self.base_assumptions
    }

    /// Get mutable reference to base assumptions for customization
    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        &mut self.base_assumptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{MortalityTable, RateTable};
    use crate::population::PopulationSnapshot;

    fn test_runner() -> ScenarioRunner {
        let flat = |rate: f64, first: u32, last: u32| {
            let years = (last - first + 1) as usize;
            MortalityTable::new(first, vec![vec![(rate, rate); 101]; years]).unwrap()
        };
        ScenarioRunner::with_assumptions(Assumptions {
            historical_mortality: flat(0.01, 1990, 2019),
            predicted_mortality: flat(0.012, 1990, 2100),
            birth_rates: RateTable::new("birth", 1990, vec![0.013; 111]).unwrap(),
            migration_rates: RateTable::new("net migration", 1990, vec![0.002; 111]).unwrap(),
        })
    }

    #[test]
    fn test_scenario_batch() {
        let runner = test_runner();
        let initial =
            PopulationSnapshot::new(1991, vec![1_000.0; 101], vec![1_000.0; 101]).unwrap();

        let configs: Vec<ProjectionConfig> = [2000, 2050]
            .iter()
            .map(|&end_year| ProjectionConfig {
                end_year,
                ..Default::default()
            })
            .collect();

        let results = runner.run_scenarios(&initial, &configs).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].end_year(), 2000);
        assert_eq!(results[1].end_year(), 2050);
        // Both scenarios share the first simulated years.
        assert_eq!(results[0].totals()[5], results[1].totals()[5]);
    }
}
