//! Load the initial population snapshot from a census CSV
//!
//! The census source groups everyone at the oldest ages into a single open
//! bucket (a trailing "90+" row). That bucket is spread evenly across the
//! remaining ages up to the top bucket before the projection starts, so a
//! 90+ count becomes eleven equal bands covering ages 90 through 100.

use std::path::Path;

use crate::error::ModelError;
use crate::population::PopulationSnapshot;

/// Raw CSV row matching the census format
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Male")]
    male: f64,
    #[serde(rename = "Female")]
    female: f64,
}

/// Parse an age label, accepting a trailing `+` on the open bucket row.
fn parse_age(label: &str) -> Result<usize, ModelError> {
    label
        .trim()
        .trim_end_matches('+')
        .parse::<usize>()
        .map_err(|_| ModelError::Parse {
            field: "age",
            value: label.to_string(),
        })
}

/// Load the initial age/sex structure for `year`.
///
/// Rows must cover a contiguous age range starting at 0; the last row is
/// treated as an open bucket and divided evenly across the ages from the
/// bucket up to `top_age` inclusive.
pub fn load_initial_population(
    path: &Path,
    year: u32,
    top_age: usize,
) -> Result<PopulationSnapshot, ModelError> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut rows: Vec<(usize, f64, f64)> = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        rows.push((parse_age(&row.age)?, row.male, row.female));
    }
    rows.sort_by_key(|&(age, _, _)| age);

    let Some(&(bucket_age, bucket_male, bucket_female)) = rows.last() else {
        return Err(ModelError::InputShape(format!(
            "initial population table {} is empty",
            path.display()
        )));
    };
    if bucket_age > top_age {
        return Err(ModelError::InputShape(format!(
            "initial population reaches age {bucket_age}, past the top bucket {top_age}"
        )));
    }
    for (expected, &(age, _, _)) in rows.iter().enumerate() {
        if age != expected {
            return Err(ModelError::InputShape(format!(
                "initial population ages are not contiguous: expected {expected}, found {age}"
            )));
        }
    }

    let mut male = vec![0.0; top_age + 1];
    let mut female = vec![0.0; top_age + 1];
    for &(age, m, f) in rows.iter().take(bucket_age) {
        male[age] = m;
        female[age] = f;
    }

    // Spread the open bucket evenly across the remaining ages.
    let bands = (top_age - bucket_age + 1) as f64;
    for age in bucket_age..=top_age {
        male[age] = bucket_male / bands;
        female[age] = bucket_female / bands;
    }
    log::debug!(
        "redistributed {bucket_age}+ bucket across {bands} bands ({} male, {} female)",
        bucket_male,
        bucket_female
    );

    PopulationSnapshot::new(year, male, female)
}
