//! Population projection CLI
//!
//! Loads the census snapshot and assumption tables, projects the age
//! structure over the configured horizon, and writes the per-sex
//! population tables plus the total-population series.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use population_projection::assumptions::loader::INITIAL_POPULATION_FILE;
use population_projection::projection::{
    DEFAULT_END_YEAR, DEFAULT_MORTALITY_CUTOVER_YEAR, DEFAULT_START_YEAR,
};
use population_projection::{
    load_initial_population, Assumptions, PopulationTimeSeries, ProjectionConfig,
    ProjectionEngine, Sex,
};

#[derive(Parser, Debug)]
#[command(name = "population_projection")]
#[command(about = "Cohort-survival population projection")]
struct Args {
    /// Directory containing the input CSV tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for the output tables
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// First simulated year (the census snapshot's year)
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    start_year: u32,

    /// Last simulated year
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    end_year: u32,

    /// First year advanced with extrapolated mortality
    #[arg(long, default_value_t = DEFAULT_MORTALITY_CUTOVER_YEAR)]
    cutover_year: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ProjectionConfig {
        start_year: args.start_year,
        end_year: args.end_year,
        mortality_cutover_year: args.cutover_year,
        ..Default::default()
    };

    let start = Instant::now();
    println!("Loading assumptions from {}...", args.data_dir.display());
    let assumptions = Assumptions::from_csv_path(&args.data_dir, config.top_age)
        .context("loading assumption tables")?;
    let initial = load_initial_population(
        &args.data_dir.join(INITIAL_POPULATION_FILE),
        config.start_year,
        config.top_age,
    )
    .context("loading initial population")?;
    println!(
        "Loaded inputs in {:?}; initial population ({}): {:.0}",
        start.elapsed(),
        config.start_year,
        initial.total()
    );

    let engine = ProjectionEngine::new(assumptions, config)?;
    let projection_start = Instant::now();
    let series = engine.run(initial)?;
    println!(
        "Projected {}-{} in {:?}",
        series.start_year(),
        series.end_year(),
        projection_start.elapsed()
    );

    std::fs::create_dir_all(&args.output_dir)?;
    write_population_table(
        &args.output_dir.join("population_male.csv"),
        &series,
        Sex::Male,
    )?;
    write_population_table(
        &args.output_dir.join("population_female.csv"),
        &series,
        Sex::Female,
    )?;
    write_totals(&args.output_dir.join("population_totals.csv"), &series)?;
    println!("Output written to {}", args.output_dir.display());

    let summary = series.summary();
    println!("\nSummary:");
    println!("  Simulated years:  {}", summary.simulated_years);
    println!("  Initial total:    {:.0}", summary.initial_total);
    println!("  Final total:      {:.0}", summary.final_total);
    println!(
        "  Peak total:       {:.0} in {}",
        summary.peak_total, summary.peak_year
    );

    println!("\nMilestones:");
    for year in [2018, 2041, series.end_year()] {
        if let Some(snapshot) = series.get(year) {
            println!(
                "  {}: total={:.0} male={:.0} female={:.0}",
                year,
                snapshot.total(),
                snapshot.sex_total(Sex::Male),
                snapshot.sex_total(Sex::Female),
            );
        }
    }

    Ok(())
}

/// One sex's age structure: rows = age, one column per simulated year.
fn write_population_table(
    path: &Path,
    series: &PopulationTimeSeries,
    sex: Sex,
) -> anyhow::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;

    write!(file, "Age")?;
    for snapshot in series.snapshots() {
        write!(file, ",{}", snapshot.year())?;
    }
    writeln!(file)?;

    let top_age = series.snapshots()[0].top_age();
    for age in 0..=top_age {
        write!(file, "{age}")?;
        for snapshot in series.snapshots() {
            write!(file, ",{:.4}", snapshot.count(sex, age))?;
        }
        writeln!(file)?;
    }
    Ok(())
}

/// Total population per simulated year.
fn write_totals(path: &Path, series: &PopulationTimeSeries) -> anyhow::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;

    writeln!(file, "Year,Total")?;
    let start_year = series.start_year();
    for (offset, total) in series.totals().iter().enumerate() {
        writeln!(file, "{},{:.4}", start_year + offset as u32, total)?;
    }
    Ok(())
}
