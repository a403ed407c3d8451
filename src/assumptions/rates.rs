//! Year-indexed scalar rate tables
//!
//! Crude birth rates and net migration rates are both a single scalar per
//! calendar year (births, or net migrants, per unit of total population).

use crate::error::ModelError;

/// A scalar per-year rate covering a contiguous year range.
#[derive(Debug, Clone)]
pub struct RateTable {
    /// Table name used in error context ("birth", "net migration")
    name: &'static str,
    first_year: u32,
    values: Vec<f64>,
}

impl RateTable {
    pub fn new(name: &'static str, first_year: u32, values: Vec<f64>) -> Result<Self, ModelError> {
        if values.is_empty() {
            return Err(ModelError::InputShape(format!(
                "{name} rate table has no years"
            )));
        }
        for (offset, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(ModelError::InputShape(format!(
                    "{name} rate {value} for year {} is not finite",
                    first_year + offset as u32
                )));
            }
        }
        Ok(Self {
            name,
            first_year,
            values,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn first_year(&self) -> u32 {
        self.first_year
    }

    pub fn last_year(&self) -> u32 {
        self.first_year + self.values.len() as u32 - 1
    }

    pub fn covers(&self, year: u32) -> bool {
        year >= self.first_year && year <= self.last_year()
    }

    pub fn covers_range(&self, first: u32, last: u32) -> bool {
        self.covers(first) && self.covers(last)
    }

    /// Rate for a calendar year. An absent year is an error, never an
    /// implicit zero.
    pub fn get(&self, year: u32) -> Result<f64, ModelError> {
        if !self.covers(year) {
            return Err(ModelError::MissingRate {
                table: self.name,
                year,
            });
        }
        Ok(self.values[(year - self.first_year) as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = RateTable::new("birth", 1950, vec![0.010, 0.011, 0.012]).unwrap();

        assert_eq!(table.first_year(), 1950);
        assert_eq!(table.last_year(), 1952);
        assert_eq!(table.get(1951).unwrap(), 0.011);
    }

    #[test]
    fn test_missing_year_is_fatal() {
        let table = RateTable::new("net migration", 1950, vec![0.002]).unwrap();

        let err = table.get(1960).unwrap_err();
        assert!(matches!(
            err,
            ModelError::MissingRate {
                table: "net migration",
                year: 1960
            }
        ));
    }

    #[test]
    fn test_non_finite_rate_is_rejected() {
        let result = RateTable::new("birth", 1950, vec![0.01, f64::NAN]);
        assert!(matches!(result, Err(ModelError::InputShape(_))));
    }
}
