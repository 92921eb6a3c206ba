//! Circuit model library - closed-form lumped topologies
//!
//! A closed, tagged set of candidate lumped networks, each a pure function
//! (frequency, parameters) -> complex impedance with angular frequency
//! w = 2 pi f.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Candidate lumped circuit topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitTopology {
    /// R + jwL + 1/(jwC)
    SeriesRlc,
    /// Dual of the series form: Y = 1/R + 1/(jwL) + jwC
    ParallelRlc,
    /// R + jwL
    SeriesRl,
    /// R + 1/(jwC)
    SeriesRc,
    /// jwL + 1/(jwC)
    SeriesLc,
}

impl CircuitTopology {
    /// All supported topologies, in the order tried by an `auto` run
    pub const ALL: [CircuitTopology; 5] = [
        CircuitTopology::SeriesRlc,
        CircuitTopology::ParallelRlc,
        CircuitTopology::SeriesRl,
        CircuitTopology::SeriesRc,
        CircuitTopology::SeriesLc,
    ];

    /// Configuration name of this topology
    pub fn name(&self) -> &'static str {
        match self {
            CircuitTopology::SeriesRlc => "series-rlc",
            CircuitTopology::ParallelRlc => "parallel-rlc",
            CircuitTopology::SeriesRl => "series-rl",
            CircuitTopology::SeriesRc => "series-rc",
            CircuitTopology::SeriesLc => "series-lc",
        }
    }

    /// Which of (R, L, C) this topology actually fits
    pub fn active(&self) -> (bool, bool, bool) {
        match self {
            CircuitTopology::SeriesRlc | CircuitTopology::ParallelRlc => (true, true, true),
            CircuitTopology::SeriesRl => (true, true, false),
            CircuitTopology::SeriesRc => (true, false, true),
            CircuitTopology::SeriesLc => (false, true, true),
        }
    }

    /// Number of free parameters
    pub fn param_count(&self) -> usize {
        let (r, l, c) = self.active();
        r as usize + l as usize + c as usize
    }
}

impl fmt::Display for CircuitTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CircuitTopology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "series-rlc" | "series" => Ok(CircuitTopology::SeriesRlc),
            "parallel-rlc" | "parallel" => Ok(CircuitTopology::ParallelRlc),
            "series-rl" => Ok(CircuitTopology::SeriesRl),
            "series-rc" => Ok(CircuitTopology::SeriesRc),
            "series-lc" => Ok(CircuitTopology::SeriesLc),
            other => Err(format!("unknown circuit topology '{}'", other)),
        }
    }
}

/// Lumped element values: resistance (Ohm), inductance (H), capacitance (F)
///
/// Components a topology does not use are carried but ignored by its
/// closed form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub r: f64,
    pub l: f64,
    pub c: f64,
}

impl ParameterSet {
    pub fn new(r: f64, l: f64, c: f64) -> Self {
        Self { r, l, c }
    }
}

/// True when every parameter the topology uses is finite and positive
///
/// The closed forms have poles at L = 0 and C = 0, so the physical domain
/// is open: strictly positive values only. Candidates outside the domain
/// must be rejected before evaluation (the fitter maps them to infinite
/// cost).
pub fn in_domain(topology: CircuitTopology, params: &ParameterSet) -> bool {
    let (use_r, use_l, use_c) = topology.active();
    let ok = |v: f64| v.is_finite() && v > 0.0;
    (!use_r || ok(params.r)) && (!use_l || ok(params.l)) && (!use_c || ok(params.c))
}

/// Predicted complex impedance of `topology` at frequency `f_hz`
pub fn impedance(topology: CircuitTopology, params: &ParameterSet, f_hz: f64) -> Complex64 {
    let w = 2.0 * PI * f_hz;
    let j = Complex64::i();

    match topology {
        CircuitTopology::SeriesRlc => {
            params.r + j * w * params.l + 1.0 / (j * w * params.c)
        }
        CircuitTopology::ParallelRlc => {
            let y = 1.0 / params.r + 1.0 / (j * w * params.l) + j * w * params.c;
            1.0 / y
        }
        CircuitTopology::SeriesRl => params.r + j * w * params.l,
        CircuitTopology::SeriesRc => params.r + 1.0 / (j * w * params.c),
        CircuitTopology::SeriesLc => j * w * params.l + 1.0 / (j * w * params.c),
    }
}

/// Resonant frequency (Hz) of an L-C pair, 1 / (2 pi sqrt(LC))
pub fn resonant_frequency(l: f64, c: f64) -> f64 {
    1.0 / (2.0 * PI * (l * c).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_series_rlc_at_resonance() {
        // At resonance the reactances cancel and Z = R
        let p = ParameterSet::new(2.0, 1e-9, 1e-12);
        let f0 = resonant_frequency(p.l, p.c);
        let z = impedance(CircuitTopology::SeriesRlc, &p, f0);

        assert_relative_eq!(z.re, 2.0, epsilon = 1e-9);
        assert_relative_eq!(z.im, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_series_rlc_low_frequency_capacitive() {
        let p = ParameterSet::new(2.0, 1e-9, 1e-12);
        let z = impedance(CircuitTopology::SeriesRlc, &p, 1e6);

        assert_relative_eq!(z.re, 2.0, epsilon = 1e-9);
        // Im ~ -1/(wC), strongly capacitive
        assert!(z.im < -1e5);
    }

    #[test]
    fn test_parallel_rlc_at_resonance() {
        // At resonance the susceptances cancel and Z = R (maximum)
        let p = ParameterSet::new(1e3, 10e-9, 1e-12);
        let f0 = resonant_frequency(p.l, p.c);
        let z = impedance(CircuitTopology::ParallelRlc, &p, f0);

        assert_relative_eq!(z.re, 1e3, max_relative = 1e-6);
        assert_relative_eq!(z.im / z.norm(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_series_rl() {
        let p = ParameterSet::new(5.0, 1e-9, 0.0);
        let f = 1e9;
        let z = impedance(CircuitTopology::SeriesRl, &p, f);

        assert_relative_eq!(z.re, 5.0, epsilon = 1e-12);
        assert_relative_eq!(z.im, 2.0 * PI * f * 1e-9, max_relative = 1e-12);
    }

    #[test]
    fn test_series_lc_is_lossless() {
        let p = ParameterSet::new(0.0, 1e-9, 1e-12);
        let z = impedance(CircuitTopology::SeriesLc, &p, 1e9);
        assert_relative_eq!(z.re, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_in_domain() {
        let p = ParameterSet::new(1.0, 1e-9, 1e-12);
        assert!(in_domain(CircuitTopology::SeriesRlc, &p));

        // Zero is outside the open domain of an active component
        let p = ParameterSet::new(1.0, 0.0, 1e-12);
        assert!(!in_domain(CircuitTopology::SeriesRlc, &p));
        // ... but fine when the component is inactive
        assert!(in_domain(CircuitTopology::SeriesRc, &p));

        let p = ParameterSet::new(-1.0, 1e-9, 1e-12);
        assert!(!in_domain(CircuitTopology::SeriesRlc, &p));
        let p = ParameterSet::new(f64::NAN, 1e-9, 1e-12);
        assert!(!in_domain(CircuitTopology::SeriesRlc, &p));
    }

    #[test]
    fn test_topology_from_str() {
        assert_eq!(
            "series-rlc".parse::<CircuitTopology>().unwrap(),
            CircuitTopology::SeriesRlc
        );
        assert_eq!(
            "PARALLEL_RLC".parse::<CircuitTopology>().unwrap(),
            CircuitTopology::ParallelRlc
        );
        // Shorthand for the two full three-element forms
        assert_eq!(
            "series".parse::<CircuitTopology>().unwrap(),
            CircuitTopology::SeriesRlc
        );
        assert!("series-xy".parse::<CircuitTopology>().is_err());
    }

    #[test]
    fn test_param_count() {
        assert_eq!(CircuitTopology::SeriesRlc.param_count(), 3);
        assert_eq!(CircuitTopology::SeriesRl.param_count(), 2);
        assert_eq!(CircuitTopology::SeriesLc.param_count(), 2);
    }
}
