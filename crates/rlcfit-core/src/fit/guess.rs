//! Initial-guess heuristics
//!
//! Derives a starting parameter set from the asymptotic behavior of the
//! measured impedance: DC resistance from the low-frequency real part,
//! capacitance from the low-frequency reactance, inductance from the
//! high-frequency reactance.

use std::f64::consts::PI;

use crate::models::{CircuitTopology, ParameterSet};
use crate::network::NetworkResponse;

/// Fallback element values when an asymptote gives no usable signal.
/// These mirror the defaults of typical microstrip extraction runs.
const FALLBACK_R: f64 = 10.0;
const FALLBACK_L: f64 = 1e-9;
const FALLBACK_C: f64 = 1e-12;

/// Derive a heuristic initial guess for `topology` from the response
///
/// All returned values are finite and strictly positive, so the guess is
/// always inside the fitter's parameter domain.
pub fn heuristic_guess(topology: CircuitTopology, response: &NetworkResponse) -> ParameterSet {
    let points = response.points();
    let lo = points.first();
    let hi = points.last();

    let clamp = |v: f64, fallback: f64| -> f64 {
        if v.is_finite() && v > 0.0 {
            v
        } else {
            fallback
        }
    };

    match topology {
        CircuitTopology::SeriesRlc
        | CircuitTopology::SeriesRl
        | CircuitTopology::SeriesRc
        | CircuitTopology::SeriesLc => {
            // Series forms: R dominates the low-frequency real part,
            // -1/(wC) the low-frequency reactance, wL the high-frequency
            // reactance.
            let r = lo.map_or(FALLBACK_R, |p| clamp(p.value.re, FALLBACK_R));
            let c = lo.map_or(FALLBACK_C, |p| {
                let w = 2.0 * PI * p.freq_hz;
                clamp(-1.0 / (w * p.value.im), FALLBACK_C)
            });
            let l = hi.map_or(FALLBACK_L, |p| {
                let w = 2.0 * PI * p.freq_hz;
                clamp(p.value.im / w, FALLBACK_L)
            });
            ParameterSet::new(r, l, c)
        }
        CircuitTopology::ParallelRlc => {
            // Parallel form: |Z| peaks at R on resonance, the high-frequency
            // branch is capacitive (Y ~ jwC), and L follows from the
            // resonance location.
            let r = points
                .iter()
                .map(|p| p.value.norm())
                .fold(0.0, f64::max);
            let r = clamp(r, FALLBACK_R);

            let c = hi.map_or(FALLBACK_C, |p| {
                let w = 2.0 * PI * p.freq_hz;
                let y = 1.0 / p.value;
                clamp(y.im / w, FALLBACK_C)
            });

            let f0 = points
                .iter()
                .max_by(|a, b| a.value.norm().total_cmp(&b.value.norm()))
                .map(|p| p.freq_hz);
            let l = f0.map_or(FALLBACK_L, |f0| {
                let w0 = 2.0 * PI * f0;
                clamp(1.0 / (w0 * w0 * c), FALLBACK_L)
            });

            ParameterSet::new(r, l, c)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{Frequency, FrequencyUnit, SweepType};
    use crate::models::impedance;
    use crate::network::{convert, Reduction};
    use crate::TwoPort;
    use approx::assert_relative_eq;
    use ndarray::Array3;
    use num_complex::Complex64;

    fn response_for(topology: CircuitTopology, truth: &ParameterSet) -> NetworkResponse {
        let freq = Frequency::new(1.0, 10_000.0, 101, FrequencyUnit::MHz, SweepType::Linear);
        let z0 = 50.0;
        let mut s = Array3::<Complex64>::zeros((101, 2, 2));
        for (k, &f_hz) in freq.f().iter().enumerate() {
            let z = impedance(topology, truth, f_hz);
            s[[k, 0, 0]] = (z - z0) / (z + z0);
        }
        convert(&TwoPort::new(freq, s, z0), Reduction::Reflection, None).unwrap()
    }

    #[test]
    fn test_series_rlc_guess_close_to_truth() {
        let truth = ParameterSet::new(2.0, 1e-9, 1e-12);
        let guess = heuristic_guess(CircuitTopology::SeriesRlc, &response_for(
            CircuitTopology::SeriesRlc,
            &truth,
        ));

        // R and C asymptotes are nearly exact; L carries the residual
        // capacitive reactance at the top of the band
        assert_relative_eq!(guess.r, truth.r, max_relative = 0.05);
        assert_relative_eq!(guess.c, truth.c, max_relative = 0.05);
        assert!(guess.l > 0.1 * truth.l && guess.l < 10.0 * truth.l);
    }

    #[test]
    fn test_guess_always_in_domain() {
        // A flat, purely resistive response gives no reactive signal, so
        // the heuristic must fall back rather than emit zeros or negatives
        let freq = Frequency::new(1.0, 100.0, 11, FrequencyUnit::MHz, SweepType::Linear);
        let mut s = Array3::<Complex64>::zeros((11, 2, 2));
        for k in 0..11 {
            s[[k, 0, 0]] = Complex64::new(0.5, 0.0);
        }
        let response = convert(&TwoPort::new(freq, s, 50.0), Reduction::Reflection, None).unwrap();

        for topology in CircuitTopology::ALL {
            let guess = heuristic_guess(topology, &response);
            assert!(
                crate::models::in_domain(topology, &guess),
                "guess out of domain for {}",
                topology
            );
        }
    }
}
