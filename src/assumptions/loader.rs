//! CSV-based assumption loaders
//!
//! Tables follow the source layout: mortality files carry one row per age
//! and one column per calendar year (the published tables list years newest
//! first, so both column orders are accepted); rate files carry a single
//! data row with one column per year.

use std::path::Path;

use crate::assumptions::{MortalityTable, RateTable};
use crate::error::ModelError;

/// Default file names under the data directory
pub const FEMALE_MORTALITY_FILE: &str = "mortalities_female.csv";
pub const MALE_MORTALITY_FILE: &str = "mortalities_male.csv";
pub const FEMALE_PREDICTED_FILE: &str = "mortalities_female_predicted.csv";
pub const MALE_PREDICTED_FILE: &str = "mortalities_male_predicted.csv";
pub const BIRTH_RATES_FILE: &str = "birth_rates.csv";
pub const MIGRATION_RATES_FILE: &str = "net_migration_rates.csv";
pub const INITIAL_POPULATION_FILE: &str = "population_initial.csv";

/// Year columns of a wide table: first year plus whether the file lists
/// years oldest-first.
struct YearColumns {
    first_year: u32,
    count: usize,
    ascending: bool,
}

impl YearColumns {
    /// Index into an ascending-year vector for the value in column `column`.
    fn position(&self, column: usize) -> usize {
        if self.ascending {
            column
        } else {
            self.count - 1 - column
        }
    }
}

/// Parse the year columns of a header row (everything after the label
/// column), requiring a contiguous run in either direction.
fn parse_year_columns(headers: &csv::StringRecord, path: &Path) -> Result<YearColumns, ModelError> {
    let years: Vec<u32> = headers
        .iter()
        .skip(1)
        .map(|h| {
            h.trim().parse::<u32>().map_err(|_| ModelError::Parse {
                field: "year",
                value: h.to_string(),
            })
        })
        .collect::<Result<_, _>>()?;

    if years.is_empty() {
        return Err(ModelError::InputShape(format!(
            "{} has no year columns",
            path.display()
        )));
    }
    let ascending = years.len() == 1 || years[1] > years[0];
    for pair in years.windows(2) {
        let step_ok = if ascending {
            pair[1] == pair[0] + 1
        } else {
            pair[1] + 1 == pair[0]
        };
        if !step_ok {
            return Err(ModelError::InputShape(format!(
                "{} year columns are not contiguous around {}",
                path.display(),
                pair[1]
            )));
        }
    }

    let first_year = if ascending {
        years[0]
    } else {
        years[years.len() - 1]
    };
    Ok(YearColumns {
        first_year,
        count: years.len(),
        ascending,
    })
}

fn parse_value(field: &str, name: &'static str) -> Result<f64, ModelError> {
    field.trim().parse::<f64>().map_err(|_| ModelError::Parse {
        field: name,
        value: field.to_string(),
    })
}

/// One sex's mortality data: age-major rows, years ascending.
pub(crate) struct SexSeries {
    pub first_year: u32,
    pub rows: Vec<Vec<f64>>,
}

/// Load one sex's mortality table.
///
/// Rows must cover ages 0..=top_age contiguously. Rows beyond the top
/// bucket (the source tables carry a synthetic age-101 row pinned to 1.0,
/// an artifact of their original use) are discarded.
pub(crate) fn load_sex_mortality(path: &Path, top_age: usize) -> Result<SexSeries, ModelError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns = parse_year_columns(reader.headers()?, path)?;

    let mut rows: Vec<(usize, Vec<f64>)> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let Some(label) = record.get(0) else {
            continue;
        };
        let age: usize = label
            .trim()
            .trim_end_matches('+')
            .parse()
            .map_err(|_| ModelError::Parse {
                field: "age",
                value: label.to_string(),
            })?;
        if age > top_age {
            log::debug!(
                "discarding artifact row for age {age} in {}",
                path.display()
            );
            continue;
        }
        if record.len() != columns.count + 1 {
            return Err(ModelError::InputShape(format!(
                "{} row for age {age} has {} values, expected {}",
                path.display(),
                record.len() - 1,
                columns.count
            )));
        }

        let mut values = vec![0.0; columns.count];
        for (column, field) in record.iter().skip(1).enumerate() {
            values[columns.position(column)] = parse_value(field, "mortality")?;
        }
        rows.push((age, values));
    }

    rows.sort_by_key(|&(age, _)| age);
    if rows.len() != top_age + 1 {
        return Err(ModelError::InputShape(format!(
            "{} covers {} ages, expected 0-{}",
            path.display(),
            rows.len(),
            top_age
        )));
    }
    for (expected, &(age, _)) in rows.iter().enumerate() {
        if age != expected {
            return Err(ModelError::InputShape(format!(
                "{} ages are not contiguous: expected {expected}, found {age}",
                path.display()
            )));
        }
    }

    Ok(SexSeries {
        first_year: columns.first_year,
        rows: rows.into_iter().map(|(_, values)| values).collect(),
    })
}

/// Load and merge the per-sex mortality files into a single table.
pub fn load_mortality_table(
    dir: &Path,
    female_file: &str,
    male_file: &str,
    top_age: usize,
) -> Result<MortalityTable, ModelError> {
    let female = load_sex_mortality(&dir.join(female_file), top_age)?;
    let male = load_sex_mortality(&dir.join(male_file), top_age)?;

    if female.first_year != male.first_year
        || female.rows[0].len() != male.rows[0].len()
    {
        return Err(ModelError::InputShape(format!(
            "{female_file} and {male_file} cover different year ranges"
        )));
    }

    MortalityTable::from_age_series(female.first_year, female.rows, male.rows)
}

/// Load a single-row rate table (label column, then one column per year).
pub fn load_rate_table(path: &Path, name: &'static str) -> Result<RateTable, ModelError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns = parse_year_columns(reader.headers()?, path)?;

    let mut records = reader.records();
    let Some(record) = records.next() else {
        return Err(ModelError::InputShape(format!(
            "{} has no data row",
            path.display()
        )));
    };
    let record = record?;
    if record.len() != columns.count + 1 {
        return Err(ModelError::InputShape(format!(
            "{} data row has {} values, expected {}",
            path.display(),
            record.len() - 1,
            columns.count
        )));
    }

    let mut values = vec![0.0; columns.count];
    for (column, field) in record.iter().skip(1).enumerate() {
        values[columns.position(column)] = parse_value(field, name)?;
    }

    RateTable::new(name, columns.first_year, values)
}
