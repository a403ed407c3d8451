//! Mortality extrapolation CLI
//!
//! Fits the exponential-decay model to every age band of the historical
//! mortality tables and writes the predicted tables covering the projection
//! horizon, plus per-age fit diagnostics. Supports JSON summary output via
//! the --json flag.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use population_projection::assumptions::loader::{
    self, FEMALE_MORTALITY_FILE, FEMALE_PREDICTED_FILE, MALE_MORTALITY_FILE, MALE_PREDICTED_FILE,
};
use population_projection::projection::{DEFAULT_END_YEAR, DEFAULT_TOP_AGE};
use population_projection::{FitResult, MortalityExtrapolator, MortalityTable, Sex};

#[derive(Parser, Debug)]
#[command(name = "predict_mortality")]
#[command(about = "Extrapolate per-age mortality tables over the projection horizon")]
struct Args {
    /// Directory containing the historical mortality tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for the predicted tables and diagnostics. Defaults to the
    /// data directory, where the projector expects to find them.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Last year of the extrapolated horizon
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    end_year: u32,

    /// Top age bucket of the mortality tables
    #[arg(long, default_value_t = DEFAULT_TOP_AGE)]
    top_age: usize,

    /// Print a JSON summary instead of the text report
    #[arg(long)]
    json: bool,
}

/// JSON summary of an extrapolation run
#[derive(Serialize)]
struct ExtrapolationResponse {
    first_year: u32,
    last_year: u32,
    series_fitted: usize,
    mean_residual_male: f64,
    mean_residual_female: f64,
    worst_fits: Vec<FitResult>,
    execution_time_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let output_dir = args.output_dir.unwrap_or_else(|| args.data_dir.clone());

    let historical = loader::load_mortality_table(
        &args.data_dir,
        FEMALE_MORTALITY_FILE,
        MALE_MORTALITY_FILE,
        args.top_age,
    )
    .context("loading historical mortality")?;
    historical.validate_bounds()?;
    if !args.json {
        println!(
            "Loaded historical mortality {}-{} for ages 0-{}",
            historical.first_year(),
            historical.last_year(),
            historical.max_age()
        );
    }

    let start = Instant::now();
    let forecast = MortalityExtrapolator::new(args.end_year).extrapolate(&historical)?;
    let elapsed = start.elapsed();

    std::fs::create_dir_all(&output_dir)?;
    write_predicted_table(
        &output_dir.join(MALE_PREDICTED_FILE),
        &forecast.table,
        Sex::Male,
    )?;
    write_predicted_table(
        &output_dir.join(FEMALE_PREDICTED_FILE),
        &forecast.table,
        Sex::Female,
    )?;
    write_diagnostics(
        &output_dir.join("mortality_fit_diagnostics.csv"),
        &forecast.diagnostics,
    )?;

    if args.json {
        let response = ExtrapolationResponse {
            first_year: forecast.table.first_year(),
            last_year: forecast.table.last_year(),
            series_fitted: forecast.diagnostics.len(),
            mean_residual_male: forecast.mean_residual(Sex::Male),
            mean_residual_female: forecast.mean_residual(Sex::Female),
            worst_fits: forecast.worst_fits(5).into_iter().cloned().collect(),
            execution_time_ms: elapsed.as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("Fitted {} series in {:?}", forecast.diagnostics.len(), elapsed);
        println!("Predicted tables written to {}", output_dir.display());

        println!("\nWorst fits by mean absolute residual:");
        for fit in forecast.worst_fits(5) {
            println!(
                "  {:>6} age {:>3}: a={:.6} b={:.6} residual={:.6}",
                fit.sex, fit.age, fit.amplitude, fit.decay, fit.mean_abs_residual
            );
        }
    }

    Ok(())
}

/// One sex's predicted table: rows = age, one column per horizon year.
fn write_predicted_table(path: &Path, table: &MortalityTable, sex: Sex) -> anyhow::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;

    write!(file, "Age")?;
    for year in table.first_year()..=table.last_year() {
        write!(file, ",{year}")?;
    }
    writeln!(file)?;

    for age in 0..=table.max_age() {
        write!(file, "{age}")?;
        for year in table.first_year()..=table.last_year() {
            write!(file, ",{:.8}", table.annual_rate(age, sex, year)?)?;
        }
        writeln!(file)?;
    }
    Ok(())
}

fn write_diagnostics(path: &Path, diagnostics: &[FitResult]) -> anyhow::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;

    writeln!(file, "Sex,Age,Amplitude,Decay,MeanAbsResidual")?;
    for fit in diagnostics {
        writeln!(
            file,
            "{},{},{:.8},{:.8},{:.8}",
            fit.sex, fit.age, fit.amplitude, fit.decay, fit.mean_abs_residual
        )?;
    }
    Ok(())
}
