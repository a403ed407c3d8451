//! Mortality tables indexed by sex, age, and calendar year
//!
//! Rates are stored year-major; within a year, index = age with the final
//! index being the closed top bucket ("100+"). Each entry holds
//! (female_rate, male_rate), matching the paired-sex layout the source
//! tables are published in.

use crate::error::ModelError;
use crate::population::Sex;

/// Annual mortality probabilities over a contiguous range of calendar years.
#[derive(Debug, Clone)]
pub struct MortalityTable {
    first_year: u32,

    /// rates[year - first_year][age] = (female_rate, male_rate)
    rates: Vec<Vec<(f64, f64)>>,
}

impl MortalityTable {
    /// Build a table from year-major rows, validating that every year
    /// carries the same age bands.
    pub fn new(first_year: u32, rates: Vec<Vec<(f64, f64)>>) -> Result<Self, ModelError> {
        let Some(first) = rates.first() else {
            return Err(ModelError::InputShape(
                "mortality table has no years".to_string(),
            ));
        };
        let bands = first.len();
        if bands == 0 {
            return Err(ModelError::InputShape(
                "mortality table has no age bands".to_string(),
            ));
        }
        for (offset, year_rates) in rates.iter().enumerate() {
            if year_rates.len() != bands {
                return Err(ModelError::InputShape(format!(
                    "mortality table year {} has {} age bands, expected {}",
                    first_year + offset as u32,
                    year_rates.len(),
                    bands
                )));
            }
        }
        Ok(Self { first_year, rates })
    }

    /// Build a table from per-sex age-major series (`series[age][year_offset]`,
    /// years ascending), as produced by the CSV loaders and the extrapolator.
    pub fn from_age_series(
        first_year: u32,
        female: Vec<Vec<f64>>,
        male: Vec<Vec<f64>>,
    ) -> Result<Self, ModelError> {
        if female.len() != male.len() {
            return Err(ModelError::InputShape(format!(
                "female and male mortality age band counts differ: {} vs {}",
                female.len(),
                male.len()
            )));
        }
        let Some(years) = female.first().map(Vec::len) else {
            return Err(ModelError::InputShape(
                "mortality series has no age bands".to_string(),
            ));
        };
        for series in female.iter().chain(male.iter()) {
            if series.len() != years {
                return Err(ModelError::InputShape(format!(
                    "mortality series cover {} and {} years for different ages",
                    years,
                    series.len()
                )));
            }
        }

        let rates = (0..years)
            .map(|offset| {
                (0..female.len())
                    .map(|age| (female[age][offset], male[age][offset]))
                    .collect()
            })
            .collect();
        Self::new(first_year, rates)
    }

    pub fn first_year(&self) -> u32 {
        self.first_year
    }

    pub fn last_year(&self) -> u32 {
        self.first_year + self.rates.len() as u32 - 1
    }

    /// Index of the top age bucket.
    pub fn max_age(&self) -> usize {
        self.rates[0].len() - 1
    }

    pub fn covers(&self, year: u32) -> bool {
        year >= self.first_year && year <= self.last_year()
    }

    pub fn covers_range(&self, first: u32, last: u32) -> bool {
        self.covers(first) && self.covers(last)
    }

    /// Annual mortality probability for an age band in a calendar year.
    pub fn annual_rate(&self, age: usize, sex: Sex, year: u32) -> Result<f64, ModelError> {
        if !self.covers(year) {
            return Err(ModelError::InputShape(format!(
                "mortality table covers {}-{}, but year {} was requested",
                self.first_year,
                self.last_year(),
                year
            )));
        }
        let year_rates = &self.rates[(year - self.first_year) as usize];
        let Some(&(female, male)) = year_rates.get(age) else {
            return Err(ModelError::InputShape(format!(
                "age {age} is outside the mortality table (top bucket {})",
                self.max_age()
            )));
        };
        Ok(match sex {
            Sex::Female => female,
            Sex::Male => male,
        })
    }

    /// Survival probability, `1 - mortality`.
    pub fn survival_probability(&self, age: usize, sex: Sex, year: u32) -> Result<f64, ModelError> {
        Ok(1.0 - self.annual_rate(age, sex, year)?)
    }

    /// One sex's series for a single age band across all years, ascending.
    pub fn series_for_age(&self, age: usize, sex: Sex) -> Result<Vec<f64>, ModelError> {
        (self.first_year..=self.last_year())
            .map(|year| self.annual_rate(age, sex, year))
            .collect()
    }

    /// Strict bounds check for observed tables: every probability must lie
    /// in [0, 1].
    pub fn validate_bounds(&self) -> Result<(), ModelError> {
        for (offset, year_rates) in self.rates.iter().enumerate() {
            let year = self.first_year + offset as u32;
            for (age, &(female, male)) in year_rates.iter().enumerate() {
                for (sex, rate) in [(Sex::Female, female), (Sex::Male, male)] {
                    if !(0.0..=1.0).contains(&rate) {
                        return Err(ModelError::InputShape(format!(
                            "{sex} mortality {rate} out of [0, 1] at age {age}, year {year}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Lenient bounds check for extrapolated tables: out-of-range values are
    /// logged with full context and counted, but kept. Clamping here would
    /// hide exactly the divergence the residual diagnostics exist to
    /// surface.
    pub fn warn_out_of_bounds(&self) -> usize {
        let mut flagged = 0;
        for (offset, year_rates) in self.rates.iter().enumerate() {
            let year = self.first_year + offset as u32;
            for (age, &(female, male)) in year_rates.iter().enumerate() {
                for (sex, rate) in [(Sex::Female, female), (Sex::Male, male)] {
                    if !(0.0..=1.0).contains(&rate) {
                        log::warn!(
                            "predicted {sex} mortality {rate:.6} out of [0, 1] at age {age}, year {year}"
                        );
                        flagged += 1;
                    }
                }
            }
        }
        flagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_year_table() -> MortalityTable {
        MortalityTable::new(
            2000,
            vec![
                vec![(0.001, 0.002), (0.01, 0.02), (0.1, 0.2)],
                vec![(0.003, 0.004), (0.03, 0.04), (0.3, 0.4)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_by_sex_age_year() {
        let table = two_year_table();

        assert_eq!(table.first_year(), 2000);
        assert_eq!(table.last_year(), 2001);
        assert_eq!(table.max_age(), 2);
        assert_eq!(table.annual_rate(1, Sex::Female, 2000).unwrap(), 0.01);
        assert_eq!(table.annual_rate(1, Sex::Male, 2001).unwrap(), 0.04);
        assert_eq!(table.survival_probability(2, Sex::Male, 2000).unwrap(), 0.8);
    }

    #[test]
    fn test_uncovered_lookups_are_rejected() {
        let table = two_year_table();
        assert!(table.annual_rate(0, Sex::Male, 1999).is_err());
        assert!(table.annual_rate(0, Sex::Male, 2002).is_err());
        assert!(table.annual_rate(3, Sex::Male, 2000).is_err());
    }

    #[test]
    fn test_series_extraction() {
        let table = two_year_table();
        assert_eq!(table.series_for_age(2, Sex::Female).unwrap(), vec![0.1, 0.3]);
    }

    #[test]
    fn test_from_age_series_round_trip() {
        let female = vec![vec![0.001, 0.003], vec![0.01, 0.03], vec![0.1, 0.3]];
        let male = vec![vec![0.002, 0.004], vec![0.02, 0.04], vec![0.2, 0.4]];
        let table = MortalityTable::from_age_series(2000, female, male).unwrap();

        assert_eq!(table.annual_rate(0, Sex::Female, 2001).unwrap(), 0.003);
        assert_eq!(table.annual_rate(2, Sex::Male, 2000).unwrap(), 0.2);
    }

    #[test]
    fn test_ragged_years_are_rejected() {
        let result =
            MortalityTable::new(2000, vec![vec![(0.1, 0.1), (0.2, 0.2)], vec![(0.1, 0.1)]]);
        assert!(matches!(result, Err(ModelError::InputShape(_))));
    }

    #[test]
    fn test_bounds_validation() {
        let table = MortalityTable::new(2000, vec![vec![(0.5, 1.5)]]).unwrap();

        let err = table.validate_bounds().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("male"));
        assert!(message.contains("age 0"));
        assert!(message.contains("2000"));

        assert_eq!(table.warn_out_of_bounds(), 1);
        assert_eq!(two_year_table().warn_out_of_bounds(), 0);
    }
}
