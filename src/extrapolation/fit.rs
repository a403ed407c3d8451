//! Exponential-decay fitting for a single mortality series
//!
//! The driving model for the prediction step is a generalised exponential
//! decay, `m(t) = a * exp(-b * t)`, fitted by derivative-free least squares
//! (Nelder-Mead on the sum of squared residuals).

use argmin::core::{CostFunction, Error, Executor, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use serde::Serialize;

use crate::population::Sex;

/// Iteration cap for a single fit; reaching it counts as non-convergence.
const MAX_FIT_ITERATIONS: u64 = 10_000;

/// Fitted decay curve `m(t) = amplitude * exp(-decay * t)`.
#[derive(Debug, Clone, Copy)]
pub struct ExpDecay {
    pub amplitude: f64,
    pub decay: f64,
}

impl ExpDecay {
    pub fn evaluate(&self, t: f64) -> f64 {
        self.amplitude * (-self.decay * t).exp()
    }
}

/// Fit diagnostics for one (sex, age) series. The residual is a fit-quality
/// signal only; nothing downstream consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    pub sex: Sex,
    pub age: usize,
    pub amplitude: f64,
    pub decay: f64,
    pub mean_abs_residual: f64,
}

/// Least-squares problem for one observed series.
struct ExpDecayProblem<'a> {
    t: &'a [f64],
    observed: &'a [f64],
}

impl CostFunction for ExpDecayProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let curve = ExpDecay {
            amplitude: param[0],
            decay: param[1],
        };
        Ok(self
            .t
            .iter()
            .zip(self.observed)
            .map(|(&t, &y)| {
                let residual = y - curve.evaluate(t);
                residual * residual
            })
            .sum())
    }
}

/// Fit the decay curve to an observed series.
///
/// Only a solver-converged termination is accepted: hitting the iteration
/// cap or ending on a non-finite cost is reported as a failure for the
/// caller to escalate.
pub(crate) fn fit_exp_decay(t: &[f64], observed: &[f64]) -> Result<ExpDecay, String> {
    if t.len() != observed.len() || t.is_empty() {
        return Err(format!(
            "series has {} observations for {} sample points",
            observed.len(),
            t.len()
        ));
    }

    // Seed the simplex near the first observation: the series starts at
    // t = 1, so the first value approximates the amplitude.
    let initial = vec![observed[0].abs().max(1e-8), 0.05];
    let mut vertices = vec![initial.clone()];
    for i in 0..initial.len() {
        let mut vertex = initial.clone();
        vertex[i] *= 1.1;
        vertices.push(vertex);
    }

    let solver = NelderMead::new(vertices);
    let problem = ExpDecayProblem { t, observed };
    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(MAX_FIT_ITERATIONS))
        .run()
        .map_err(|e| format!("optimizer error: {e}"))?;

    let state = result.state();
    match &state.termination_status {
        TerminationStatus::Terminated(TerminationReason::SolverConverged) => {}
        other => return Err(format!("did not converge: {other:?}")),
    }
    if !state.best_cost.is_finite() {
        return Err(format!("non-finite best cost {}", state.best_cost));
    }
    let Some(best) = &state.best_param else {
        return Err("no best parameters produced".to_string());
    };

    Ok(ExpDecay {
        amplitude: best[0],
        decay: best[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn synthetic_series(amplitude: f64, decay: f64, points: usize) -> (Vec<f64>, Vec<f64>) {
        let t: Vec<f64> = (1..=points).map(|i| i as f64).collect();
        let observed = t.iter().map(|&t| amplitude * (-decay * t).exp()).collect();
        (t, observed)
    }

    #[test]
    fn test_recovers_exact_decay() {
        let (t, observed) = synthetic_series(0.012, 0.03, 38);

        let curve = fit_exp_decay(&t, &observed).unwrap();

        assert_relative_eq!(curve.amplitude, 0.012, max_relative = 1e-2);
        assert_relative_eq!(curve.decay, 0.03, max_relative = 1e-2);

        // Exact data leaves essentially no residual.
        let mean_abs: f64 = t
            .iter()
            .zip(&observed)
            .map(|(&t, &y)| (y - curve.evaluate(t)).abs())
            .sum::<f64>()
            / t.len() as f64;
        assert!(mean_abs < 1e-6, "mean residual too large: {mean_abs}");
    }

    #[test]
    fn test_curve_is_continuous_at_series_end() {
        let (t, observed) = synthetic_series(0.4, 0.02, 38);
        let curve = fit_exp_decay(&t, &observed).unwrap();

        // No jump between the last fitted point and the first extrapolated
        // one beyond what the decay itself implies.
        let last = curve.evaluate(38.0);
        let next = curve.evaluate(39.0);
        assert!((last - next).abs() < 0.05 * last);
    }

    #[test]
    fn test_empty_series_is_rejected() {
        assert!(fit_exp_decay(&[], &[]).is_err());
        assert!(fit_exp_decay(&[1.0, 2.0], &[0.5]).is_err());
    }
}
