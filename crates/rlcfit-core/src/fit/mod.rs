//! Nonlinear least-squares fitter
//!
//! Fits a lumped circuit topology to a converted impedance response by a
//! bounded (non-negative) Levenberg-Marquardt search. Deterministic given
//! identical inputs; randomized multi-start only runs when explicitly
//! configured with a seed.

mod guess;
mod lm;
pub mod quality;

pub use guess::heuristic_guess;
pub use quality::{evaluate, FitQuality};

use log::debug;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_FIT_TOL, DEFAULT_MAX_ITERATIONS};
use crate::models::{CircuitTopology, ParameterSet};
use crate::network::NetworkResponse;

/// Fitting errors
///
/// Structural failures only; running out of iterations is a
/// `ConvergenceStatus`, not an error.
#[derive(Error, Debug)]
pub enum FitError {
    #[error("response has too few points for {topology}: {got} < {needed}")]
    TooFewPoints {
        topology: CircuitTopology,
        needed: usize,
        got: usize,
    },

    #[error("initial guess for {topology} lies outside the parameter domain")]
    BadInitialGuess { topology: CircuitTopology },
}

/// Residual weighting scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weighting {
    #[default]
    Uniform,
    /// Weight each point by 1/f, emphasizing the low-frequency asymptote
    InverseFrequency,
    /// Weight each point by 1/|z_meas|, equalizing relative error
    InverseMagnitude,
}

/// Deterministic multi-start configuration
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MultiStart {
    pub seed: u64,
    pub starts: usize,
}

/// Optimizer settings for one fit attempt
#[derive(Debug, Clone, Copy)]
pub struct FitSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub weighting: Weighting,
    pub multi_start: Option<MultiStart>,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_FIT_TOL,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            weighting: Weighting::Uniform,
            multi_start: None,
        }
    }
}

/// Convergence status of a fit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvergenceStatus {
    Converged,
    DidNotConverge,
}

/// Result of one fit attempt
///
/// Created once per attempt, immutable after creation.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Fitted topology
    pub topology: CircuitTopology,
    /// Fitted element values
    pub params: ParameterSet,
    /// Unweighted per-point residuals, model minus measured
    pub residuals: Vec<Complex64>,
    /// Weighted sum of squared residual magnitudes
    pub cost: f64,
    /// Optimizer iterations spent
    pub iterations: usize,
    /// Convergence status
    pub status: ConvergenceStatus,
    /// Wall-clock time of the fit (in seconds)
    pub wall_clock_time: f64,
}

/// Fit a topology to a converted impedance response
///
/// # Arguments
/// * `response` - Converted one-port impedance response
/// * `topology` - Candidate circuit topology
/// * `initial` - Starting parameter values, typically from
///   [`heuristic_guess`] or the run configuration
/// * `settings` - Optimizer tolerances and weighting
pub fn fit(
    response: &NetworkResponse,
    topology: CircuitTopology,
    initial: &ParameterSet,
    settings: &FitSettings,
) -> Result<FitResult, FitError> {
    use std::time::Instant;
    let timer_start = Instant::now();

    let needed = topology.param_count();
    if response.len() < needed {
        return Err(FitError::TooFewPoints {
            topology,
            needed,
            got: response.len(),
        });
    }
    if !crate::models::in_domain(topology, initial) {
        return Err(FitError::BadInitialGuess { topology });
    }

    let weights = point_weights(response, settings.weighting);

    let mut best = lm::levenberg_marquardt(response, topology, initial, &weights, settings);

    // Optional deterministic multi-start around the base guess
    if let Some(ms) = settings.multi_start {
        let mut rng = StdRng::seed_from_u64(ms.seed);
        for _ in 0..ms.starts {
            let perturbed = perturb_guess(topology, initial, &mut rng);
            let candidate =
                lm::levenberg_marquardt(response, topology, &perturbed, &weights, settings);
            if candidate.cost < best.cost {
                best = candidate;
            }
        }
    }

    debug!(
        "fit {}: cost {:.3e} after {} iterations ({:?})",
        topology, best.cost, best.iterations, best.status
    );

    Ok(FitResult {
        topology: best.topology,
        params: best.params,
        residuals: best.residuals,
        cost: best.cost,
        iterations: best.iterations,
        status: best.status,
        wall_clock_time: timer_start.elapsed().as_secs_f64(),
    })
}

/// Square-root weights applied to each stacked residual
fn point_weights(response: &NetworkResponse, weighting: Weighting) -> Vec<f64> {
    let points = response.points();
    let raw: Vec<f64> = match weighting {
        Weighting::Uniform => vec![1.0; points.len()],
        Weighting::InverseFrequency => points
            .iter()
            .map(|p| 1.0 / p.freq_hz.max(f64::MIN_POSITIVE))
            .collect(),
        Weighting::InverseMagnitude => points
            .iter()
            .map(|p| 1.0 / p.value.norm().max(crate::constants::NEAR_ZERO))
            .collect(),
    };

    // Normalize to mean 1 so costs stay comparable across schemes
    let mean = raw.iter().sum::<f64>() / raw.len() as f64;
    raw.iter().map(|w| (w / mean).sqrt()).collect()
}

/// Log-uniform perturbation of the active parameters within one decade
fn perturb_guess(
    topology: CircuitTopology,
    base: &ParameterSet,
    rng: &mut StdRng,
) -> ParameterSet {
    let (use_r, use_l, use_c) = topology.active();
    let mut factor = |active: bool| -> f64 {
        if active {
            10.0_f64.powf(rng.gen_range(-1.0..1.0))
        } else {
            1.0
        }
    };
    ParameterSet::new(
        base.r * factor(use_r),
        base.l * factor(use_l),
        base.c * factor(use_c),
    )
}
