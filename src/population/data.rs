//! Population data structures
//!
//! Counts are continuous (fractional values are permitted): the model tracks
//! aggregate cohort mass, not discrete individuals. Within a snapshot the
//! vector index is the integer age, with the final index being the
//! open-ended top bucket (e.g. "100+").

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Sex of a cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Both sexes, in the fixed iteration order used throughout the model.
    pub const BOTH: [Sex; 2] = [Sex::Male, Sex::Female];
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

/// Age/sex population structure for a single year.
///
/// Created exactly once (from the previous year's snapshot or from the
/// census loader) and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    year: u32,
    male: Vec<f64>,
    female: Vec<f64>,
}

impl PopulationSnapshot {
    /// Build a snapshot, validating that both sexes carry the same age bands
    /// and that no count is negative.
    pub fn new(year: u32, male: Vec<f64>, female: Vec<f64>) -> Result<Self, ModelError> {
        if male.len() != female.len() {
            return Err(ModelError::InputShape(format!(
                "male and female age band counts differ: {} vs {}",
                male.len(),
                female.len()
            )));
        }
        if male.is_empty() {
            return Err(ModelError::InputShape(format!(
                "population snapshot for year {year} has no age bands"
            )));
        }
        for (sex, counts) in [(Sex::Male, &male), (Sex::Female, &female)] {
            for (age, &count) in counts.iter().enumerate() {
                if !count.is_finite() || count < 0.0 {
                    return Err(ModelError::InputShape(format!(
                        "invalid {sex} population {count} at age {age}, year {year}"
                    )));
                }
            }
        }
        Ok(Self { year, male, female })
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    /// Index of the open-ended top age bucket.
    pub fn top_age(&self) -> usize {
        self.male.len() - 1
    }

    /// Per-age counts for one sex (index = age).
    pub fn counts(&self, sex: Sex) -> &[f64] {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }

    /// Count for a single (sex, age) cohort; ages beyond the top bucket
    /// hold nobody.
    pub fn count(&self, sex: Sex, age: usize) -> f64 {
        self.counts(sex).get(age).copied().unwrap_or(0.0)
    }

    /// Total population of one sex.
    pub fn sex_total(&self, sex: Sex) -> f64 {
        self.counts(sex).iter().sum()
    }

    /// Total population over both sexes and all ages.
    pub fn total(&self) -> f64 {
        self.sex_total(Sex::Male) + self.sex_total(Sex::Female)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_totals() {
        let snapshot =
            PopulationSnapshot::new(1991, vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]).unwrap();

        assert_eq!(snapshot.year(), 1991);
        assert_eq!(snapshot.top_age(), 2);
        assert_eq!(snapshot.sex_total(Sex::Male), 6.0);
        assert_eq!(snapshot.sex_total(Sex::Female), 15.0);
        assert_eq!(snapshot.total(), 21.0);
        assert_eq!(snapshot.count(Sex::Male, 1), 2.0);
        assert_eq!(snapshot.count(Sex::Male, 99), 0.0);
    }

    #[test]
    fn test_snapshot_rejects_mismatched_bands() {
        let result = PopulationSnapshot::new(1991, vec![1.0, 2.0], vec![1.0]);
        assert!(matches!(result, Err(ModelError::InputShape(_))));
    }

    #[test]
    fn test_snapshot_rejects_negative_counts() {
        let result = PopulationSnapshot::new(1991, vec![1.0, -2.0], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ModelError::InputShape(_))));
    }
}
