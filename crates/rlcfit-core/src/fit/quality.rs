//! Fit quality metrics
//!
//! Residual-based goodness-of-fit assessment for a completed fit attempt.

use num_complex::Complex64;

use super::FitResult;
use crate::constants::NEAR_ZERO;
use crate::network::NetworkResponse;

/// Goodness-of-fit metrics for one fit attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitQuality {
    /// Root-mean-square residual magnitude (Ohm)
    pub rmse: f64,
    /// Normalized score, 1 - residual variance / response variance;
    /// approximately 1 for a perfect fit
    pub goodness_of_fit: f64,
    /// True when the score fell below the configured threshold; advisory
    /// only, never aborts the pipeline
    pub low_confidence: bool,
}

/// Evaluate a fit result against the response it was fitted to
///
/// # Arguments
/// * `result` - Completed fit attempt
/// * `response` - The converted response the fitter used
/// * `gof_threshold` - Score below which the fit is flagged low-confidence
pub fn evaluate(result: &FitResult, response: &NetworkResponse, gof_threshold: f64) -> FitQuality {
    let n = result.residuals.len().max(1);

    let ss_res: f64 = result.residuals.iter().map(|r| r.norm_sqr()).sum();
    let rmse = (ss_res / n as f64).sqrt();

    let points = response.points();
    let mean: Complex64 = points.iter().map(|p| p.value).sum::<Complex64>()
        / Complex64::new(points.len().max(1) as f64, 0.0);
    let ss_tot: f64 = points.iter().map(|p| (p.value - mean).norm_sqr()).sum();

    let goodness_of_fit = if ss_tot > NEAR_ZERO {
        1.0 - ss_res / ss_tot
    } else if ss_res <= NEAR_ZERO {
        // Constant response matched exactly
        1.0
    } else {
        0.0
    };

    FitQuality {
        rmse,
        goodness_of_fit,
        low_confidence: goodness_of_fit < gof_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::ConvergenceStatus;
    use crate::frequency::{Frequency, FrequencyUnit};
    use crate::models::{CircuitTopology, ParameterSet};
    use crate::network::{convert, Reduction};
    use crate::TwoPort;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn response_of(values: &[Complex64]) -> NetworkResponse {
        let n = values.len();
        let freq = Frequency::from_f((1..=n).map(|i| i as f64).collect(), FrequencyUnit::GHz);
        let z0 = 50.0;
        let mut s = Array3::<Complex64>::zeros((n, 2, 2));
        for (k, &z) in values.iter().enumerate() {
            s[[k, 0, 0]] = (z - z0) / (z + z0);
        }
        convert(&TwoPort::new(freq, s, z0), Reduction::Reflection, None).unwrap()
    }

    fn result_with_residuals(residuals: Vec<Complex64>) -> FitResult {
        FitResult {
            topology: CircuitTopology::SeriesRlc,
            params: ParameterSet::new(1.0, 1e-9, 1e-12),
            residuals,
            cost: 0.0,
            iterations: 0,
            status: ConvergenceStatus::Converged,
            wall_clock_time: 0.0,
        }
    }

    #[test]
    fn test_perfect_fit_scores_one() {
        let response = response_of(&[
            Complex64::new(10.0, -5.0),
            Complex64::new(20.0, 5.0),
            Complex64::new(30.0, 15.0),
        ]);
        let result = result_with_residuals(vec![Complex64::new(0.0, 0.0); 3]);

        let q = evaluate(&result, &response, 0.9);
        assert_relative_eq!(q.rmse, 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.goodness_of_fit, 1.0, epsilon = 1e-12);
        assert!(!q.low_confidence);
    }

    #[test]
    fn test_rmse_matches_residuals() {
        let response = response_of(&[
            Complex64::new(10.0, 0.0),
            Complex64::new(200.0, 0.0),
        ]);
        // |r| = 3 and 4 -> rms = sqrt((9 + 16) / 2)
        let result = result_with_residuals(vec![
            Complex64::new(3.0, 0.0),
            Complex64::new(0.0, 4.0),
        ]);

        let q = evaluate(&result, &response, 0.9);
        assert_relative_eq!(q.rmse, (25.0_f64 / 2.0).sqrt(), epsilon = 1e-12);
        assert!(q.goodness_of_fit < 1.0);
    }

    #[test]
    fn test_low_confidence_flag() {
        let response = response_of(&[
            Complex64::new(10.0, 0.0),
            Complex64::new(12.0, 0.0),
        ]);
        // Residuals as large as the response variation
        let result = result_with_residuals(vec![
            Complex64::new(2.0, 0.0),
            Complex64::new(-2.0, 0.0),
        ]);

        let q = evaluate(&result, &response, 0.9);
        assert!(q.low_confidence);
        assert!(q.goodness_of_fit < 0.9);
    }
}
