//! Mortality extrapolation
//!
//! Fits the decay model independently to every (sex, age) historical series
//! and evaluates the fitted curves over an extended year range. Age bands
//! share no information: edge ages with sparse or noisy history can fit
//! poorly, which shows up as a large mean absolute residual rather than
//! being smoothed away.

mod fit;

pub use fit::{ExpDecay, FitResult};

use rayon::prelude::*;

use crate::assumptions::MortalityTable;
use crate::error::ModelError;
use crate::population::Sex;

/// Predicted mortality over the full horizon plus per-(sex, age) fit
/// diagnostics.
#[derive(Debug, Clone)]
pub struct MortalityForecast {
    pub table: MortalityTable,

    /// One entry per (sex, age) series, male bands first, ascending by age.
    pub diagnostics: Vec<FitResult>,
}

impl MortalityForecast {
    /// Mean of the per-age residual diagnostics for one sex.
    pub fn mean_residual(&self, sex: Sex) -> f64 {
        let residuals: Vec<f64> = self
            .diagnostics
            .iter()
            .filter(|fit| fit.sex == sex)
            .map(|fit| fit.mean_abs_residual)
            .collect();
        residuals.iter().sum::<f64>() / residuals.len().max(1) as f64
    }

    /// The `n` series with the largest residuals, worst first.
    pub fn worst_fits(&self, n: usize) -> Vec<&FitResult> {
        let mut fits: Vec<&FitResult> = self.diagnostics.iter().collect();
        fits.sort_by(|a, b| b.mean_abs_residual.total_cmp(&a.mean_abs_residual));
        fits.truncate(n);
        fits
    }
}

/// Fitted curves and residuals for one age band.
struct AgeFit {
    age: usize,
    female: (ExpDecay, f64),
    male: (ExpDecay, f64),
}

impl AgeFit {
    fn for_sex(&self, sex: Sex) -> (ExpDecay, f64) {
        match sex {
            Sex::Female => self.female,
            Sex::Male => self.male,
        }
    }
}

/// Fits historical per-age mortality and evaluates the curves over the
/// projection horizon.
#[derive(Debug, Clone, Copy)]
pub struct MortalityExtrapolator {
    horizon_end_year: u32,
}

impl MortalityExtrapolator {
    pub fn new(horizon_end_year: u32) -> Self {
        Self { horizon_end_year }
    }

    /// Fit every age band of both sexes and evaluate the curves over
    /// `historical.first_year()..=horizon_end_year` (historical years are
    /// re-evaluated too, for residual computation).
    ///
    /// A single non-converging fit aborts the whole run: a corrupted
    /// prediction for one age band would otherwise flow undetected into
    /// every downstream projection.
    pub fn extrapolate(&self, historical: &MortalityTable) -> Result<MortalityForecast, ModelError> {
        if self.horizon_end_year <= historical.last_year() {
            return Err(ModelError::InputShape(format!(
                "horizon end {} does not extend past the historical range ending {}",
                self.horizon_end_year,
                historical.last_year()
            )));
        }

        let first_year = historical.first_year();
        // The first observation sits at t = 1.
        let t_base = first_year - 1;
        let sample_t: Vec<f64> = (first_year..=historical.last_year())
            .map(|year| (year - t_base) as f64)
            .collect();

        // Every band is fitted independently; fan out across ages and
        // collect in ascending order so diagnostics stay deterministic.
        let fits = (0..=historical.max_age())
            .into_par_iter()
            .map(|age| fit_age(historical, age, &sample_t))
            .collect::<Result<Vec<AgeFit>, ModelError>>()?;

        let mut rates = Vec::with_capacity((self.horizon_end_year - first_year + 1) as usize);
        for year in first_year..=self.horizon_end_year {
            let t = (year - t_base) as f64;
            rates.push(
                fits.iter()
                    .map(|fit| (fit.female.0.evaluate(t), fit.male.0.evaluate(t)))
                    .collect(),
            );
        }
        let table = MortalityTable::new(first_year, rates)?;
        table.warn_out_of_bounds();

        let mut diagnostics = Vec::with_capacity(2 * fits.len());
        for sex in Sex::BOTH {
            for age_fit in &fits {
                let (curve, mean_abs_residual) = age_fit.for_sex(sex);
                diagnostics.push(FitResult {
                    sex,
                    age: age_fit.age,
                    amplitude: curve.amplitude,
                    decay: curve.decay,
                    mean_abs_residual,
                });
            }
        }
        log::info!(
            "extrapolated {} mortality series over {}-{}",
            diagnostics.len(),
            first_year,
            self.horizon_end_year
        );

        Ok(MortalityForecast { table, diagnostics })
    }
}

/// Fit both sexes of one age band against the historical sample points.
fn fit_age(
    historical: &MortalityTable,
    age: usize,
    sample_t: &[f64],
) -> Result<AgeFit, ModelError> {
    let female = fit_sex(historical, age, Sex::Female, sample_t)?;
    let male = fit_sex(historical, age, Sex::Male, sample_t)?;
    Ok(AgeFit { age, female, male })
}

fn fit_sex(
    historical: &MortalityTable,
    age: usize,
    sex: Sex,
    sample_t: &[f64],
) -> Result<(ExpDecay, f64), ModelError> {
    let observed = historical.series_for_age(age, sex)?;
    let curve = fit::fit_exp_decay(sample_t, &observed)
        .map_err(|reason| ModelError::FitConvergence { sex, age, reason })?;

    // Mean absolute residual over the historical years only.
    let mean_abs_residual = sample_t
        .iter()
        .zip(&observed)
        .map(|(&t, &y)| (y - curve.evaluate(t)).abs())
        .sum::<f64>()
        / sample_t.len() as f64;

    log::debug!(
        "fitted {sex} age {age}: a={:.4e} b={:.4e} residual={:.4e}",
        curve.amplitude,
        curve.decay,
        mean_abs_residual
    );
    Ok((curve, mean_abs_residual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Historical table whose series follow exact decay curves, with
    /// parameters varying by age and sex.
    fn synthetic_historical() -> MortalityTable {
        let first_year = 2001;
        let last_year = 2010;
        let rates = (first_year..=last_year)
            .map(|year| {
                let t = (year - 2000) as f64;
                (0..=2)
                    .map(|age| {
                        let amplitude = 0.01 + 0.02 * age as f64;
                        let female = amplitude * (-0.03 * t).exp();
                        let male = 1.2 * amplitude * (-0.025 * t).exp();
                        (female, male)
                    })
                    .collect()
            })
            .collect();
        MortalityTable::new(first_year, rates).unwrap()
    }

    #[test]
    fn test_forecast_covers_horizon() {
        let historical = synthetic_historical();
        let forecast = MortalityExtrapolator::new(2030)
            .extrapolate(&historical)
            .unwrap();

        assert_eq!(forecast.table.first_year(), 2001);
        assert_eq!(forecast.table.last_year(), 2030);
        assert_eq!(forecast.table.max_age(), 2);
        assert_eq!(forecast.diagnostics.len(), 6);
    }

    #[test]
    fn test_exact_series_fit_closely() {
        let historical = synthetic_historical();
        let forecast = MortalityExtrapolator::new(2030)
            .extrapolate(&historical)
            .unwrap();

        for fit in &forecast.diagnostics {
            assert!(
                fit.mean_abs_residual < 1e-6,
                "{} age {} residual {}",
                fit.sex,
                fit.age,
                fit.mean_abs_residual
            );
        }

        // Far-future prediction tracks the true curve.
        let predicted = forecast.table.annual_rate(1, Sex::Female, 2030).unwrap();
        let expected = 0.03 * (-0.03 * 30.0_f64).exp();
        assert_relative_eq!(predicted, expected, max_relative = 1e-3);
    }

    #[test]
    fn test_no_discontinuity_at_historical_boundary() {
        let historical = synthetic_historical();
        let forecast = MortalityExtrapolator::new(2030)
            .extrapolate(&historical)
            .unwrap();

        for sex in Sex::BOTH {
            for age in 0..=2 {
                let last_fitted = forecast.table.annual_rate(age, sex, 2010).unwrap();
                let first_predicted = forecast.table.annual_rate(age, sex, 2011).unwrap();
                // One decay step, not a table-boundary jump.
                assert!((last_fitted - first_predicted).abs() < 0.05 * last_fitted);
            }
        }
    }

    #[test]
    fn test_diagnostics_are_in_stable_order() {
        let historical = synthetic_historical();
        let forecast = MortalityExtrapolator::new(2020)
            .extrapolate(&historical)
            .unwrap();

        let order: Vec<(Sex, usize)> = forecast
            .diagnostics
            .iter()
            .map(|fit| (fit.sex, fit.age))
            .collect();
        assert_eq!(
            order,
            vec![
                (Sex::Male, 0),
                (Sex::Male, 1),
                (Sex::Male, 2),
                (Sex::Female, 0),
                (Sex::Female, 1),
                (Sex::Female, 2),
            ]
        );
    }

    #[test]
    fn test_horizon_must_extend_history() {
        let historical = synthetic_historical();
        let result = MortalityExtrapolator::new(2010).extrapolate(&historical);
        assert!(matches!(result, Err(ModelError::InputShape(_))));
    }
}
