//! Damped least-squares (Levenberg-Marquardt) search
//!
//! The search runs over the logarithm of the active parameters, which keeps
//! every candidate inside the positive physical domain without explicit
//! bound handling. Candidates that still leave the domain through numeric
//! overflow are mapped to infinite cost, never evaluated.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use super::{ConvergenceStatus, FitResult, FitSettings};
use crate::constants::{LM_FD_STEP, LM_LAMBDA_INIT, LM_LAMBDA_MAX, SVD_TOLERANCE};
use crate::models::{self, CircuitTopology, ParameterSet};
use crate::network::NetworkResponse;

/// Run the damped search from one starting point
pub(super) fn levenberg_marquardt(
    response: &NetworkResponse,
    topology: CircuitTopology,
    initial: &ParameterSet,
    weights: &[f64],
    settings: &FitSettings,
) -> FitResult {
    let n_points = response.len();
    let n_params = topology.param_count();

    let mut x = pack(topology, initial);
    let mut residuals = residual_vector(response, topology, initial, weights)
        .unwrap_or_else(|| vec![f64::INFINITY; 2 * n_points]);
    let mut cost = sum_sq(&residuals);

    let mut lambda = LM_LAMBDA_INIT;
    let mut status = ConvergenceStatus::DidNotConverge;
    let mut iterations = 0;

    if cost == 0.0 {
        status = ConvergenceStatus::Converged;
    } else {
        for _ in 0..settings.max_iterations {
            iterations += 1;

            let jacobian = match jacobian(response, topology, initial, &x, weights) {
                Some(j) => j,
                None => break,
            };

            let jt = jacobian.transpose();
            let jtj = &jt * &jacobian;
            let r_vec = DVector::from_row_slice(&residuals);
            let gradient = &jt * &r_vec;

            // Inner damping loop: inflate lambda until a step improves
            let mut accepted = false;
            while lambda <= LM_LAMBDA_MAX {
                let mut damped = jtj.clone();
                for i in 0..n_params {
                    // Marquardt scaling keeps the step well-conditioned
                    // across the very different R/L/C magnitudes
                    damped[(i, i)] += lambda * jtj[(i, i)].max(SVD_TOLERANCE);
                }

                let step = match solve_least_squares(&damped, &(-&gradient)) {
                    Some(s) => s,
                    None => break,
                };

                let x_new: Vec<f64> = x.iter().zip(step.iter()).map(|(a, d)| a + d).collect();
                let params_new = unpack(topology, initial, &x_new);

                let trial = residual_vector(response, topology, &params_new, weights);
                let trial_cost = trial.as_ref().map_or(f64::INFINITY, |r| sum_sq(r));

                if trial_cost < cost {
                    let reduction = (cost - trial_cost) / cost;
                    x = x_new;
                    residuals = trial.unwrap_or_default();
                    cost = trial_cost;
                    lambda = (lambda * 0.1).max(1e-12);
                    accepted = true;

                    if reduction < settings.tolerance || cost == 0.0 {
                        status = ConvergenceStatus::Converged;
                    }
                    break;
                }
                lambda *= 10.0;
            }

            if !accepted {
                // No admissible step improves the objective: the search has
                // settled at a (possibly local) minimum
                status = ConvergenceStatus::Converged;
                break;
            }
            if status == ConvergenceStatus::Converged {
                break;
            }
        }
    }

    let final_params = unpack(topology, initial, &x);
    let raw_residuals = raw_residual_points(response, topology, &final_params);

    FitResult {
        topology,
        params: final_params,
        residuals: raw_residuals,
        cost,
        iterations,
        status,
        wall_clock_time: 0.0,
    }
}

/// Log-transform the active parameters into the search vector
fn pack(topology: CircuitTopology, params: &ParameterSet) -> Vec<f64> {
    let (use_r, use_l, use_c) = topology.active();
    let mut x = Vec::with_capacity(3);
    if use_r {
        x.push(params.r.ln());
    }
    if use_l {
        x.push(params.l.ln());
    }
    if use_c {
        x.push(params.c.ln());
    }
    x
}

/// Rebuild a parameter set from the search vector; inactive components keep
/// their initial values (the closed forms ignore them)
fn unpack(topology: CircuitTopology, initial: &ParameterSet, x: &[f64]) -> ParameterSet {
    let (use_r, use_l, use_c) = topology.active();
    let mut iter = x.iter();
    let mut take = |active: bool, fallback: f64| -> f64 {
        if active {
            iter.next().map_or(fallback, |v| v.exp())
        } else {
            fallback
        }
    };
    ParameterSet::new(
        take(use_r, initial.r),
        take(use_l, initial.l),
        take(use_c, initial.c),
    )
}

/// Weighted stacked residual vector [w*(re diff)..., w*(im diff)...]
///
/// None when the candidate leaves the parameter domain (infinite cost).
fn residual_vector(
    response: &NetworkResponse,
    topology: CircuitTopology,
    params: &ParameterSet,
    weights: &[f64],
) -> Option<Vec<f64>> {
    if !models::in_domain(topology, params) {
        return None;
    }

    let points = response.points();
    let mut r = Vec::with_capacity(2 * points.len());
    for (p, &w) in points.iter().zip(weights.iter()) {
        let diff = models::impedance(topology, params, p.freq_hz) - p.value;
        if !diff.re.is_finite() || !diff.im.is_finite() {
            return None;
        }
        r.push(w * diff.re);
        r.push(w * diff.im);
    }
    Some(r)
}

/// Unweighted complex residuals, model minus measured, at the final iterate
fn raw_residual_points(
    response: &NetworkResponse,
    topology: CircuitTopology,
    params: &ParameterSet,
) -> Vec<Complex64> {
    response
        .points()
        .iter()
        .map(|p| models::impedance(topology, params, p.freq_hz) - p.value)
        .collect()
}

/// Forward finite-difference Jacobian in log-parameter space
fn jacobian(
    response: &NetworkResponse,
    topology: CircuitTopology,
    initial: &ParameterSet,
    x: &[f64],
    weights: &[f64],
) -> Option<DMatrix<f64>> {
    let base_params = unpack(topology, initial, x);
    let base = residual_vector(response, topology, &base_params, weights)?;
    let rows = base.len();
    let cols = x.len();

    let mut j = DMatrix::<f64>::zeros(rows, cols);
    for col in 0..cols {
        let mut x_shift = x.to_vec();
        x_shift[col] += LM_FD_STEP;
        let params = unpack(topology, initial, &x_shift);
        let shifted = residual_vector(response, topology, &params, weights)?;
        for row in 0..rows {
            j[(row, col)] = (shifted[row] - base[row]) / LM_FD_STEP;
        }
    }
    Some(j)
}

fn sum_sq(r: &[f64]) -> f64 {
    r.iter().map(|v| v * v).sum()
}

/// SVD-based solve of the damped normal equations
fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);
    svd.solve(b, SVD_TOLERANCE).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_round_trip() {
        let p = ParameterSet::new(2.0, 1e-9, 1e-12);
        let x = pack(CircuitTopology::SeriesRlc, &p);
        assert_eq!(x.len(), 3);
        let q = unpack(CircuitTopology::SeriesRlc, &p, &x);
        assert!((q.r - p.r).abs() < 1e-12);
        assert!((q.l - p.l).abs() < 1e-21);
        assert!((q.c - p.c).abs() < 1e-24);
    }

    #[test]
    fn test_pack_skips_inactive() {
        let p = ParameterSet::new(2.0, 1e-9, 1e-12);
        let x = pack(CircuitTopology::SeriesLc, &p);
        assert_eq!(x.len(), 2);
        // R stays at its initial value
        let q = unpack(CircuitTopology::SeriesLc, &p, &x);
        assert_eq!(q.r, 2.0);
    }
}
