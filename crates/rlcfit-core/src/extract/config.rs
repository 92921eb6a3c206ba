//! Run configuration
//!
//! A `Config` is frozen for the duration of a run. It deserializes from
//! whatever format the caller loads it from; this crate never reads
//! configuration files itself.

use serde::Deserialize;
use std::str::FromStr;

use crate::constants::{DEFAULT_FIT_TOL, DEFAULT_GOF_THRESHOLD, DEFAULT_MAX_ITERATIONS};
use crate::fit::{FitSettings, MultiStart, Weighting};
use crate::models::{CircuitTopology, ParameterSet};
use crate::network::Reduction;

/// Which topology the fitter should attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TopologyChoice {
    /// Try every topology and keep the best-scoring fit
    #[default]
    Auto,
    /// Fit only the named topology
    Fixed(CircuitTopology),
}

impl TryFrom<String> for TopologyChoice {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(TopologyChoice::Auto)
        } else {
            CircuitTopology::from_str(&s).map(TopologyChoice::Fixed)
        }
    }
}

/// Settings for one extraction run
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Topology to fit, or `auto` to select by score
    pub topology: TopologyChoice,
    /// Reference impedance override (Ohm); defaults to the file's R value
    pub reference_impedance: Option<f64>,
    /// Inclusive frequency sub-band (Hz) to fit over; `None` fits the
    /// whole sweep
    pub frequency_band: Option<(f64, f64)>,
    /// How the two-port reduces to a single impedance
    pub reduction: Reduction,
    /// Per-point residual weighting
    pub weighting: Weighting,
    /// Starting parameters; `None` derives them from the response
    pub initial_guess: Option<ParameterSet>,
    /// Relative cost-reduction convergence tolerance
    pub tolerance: f64,
    /// Iteration cap per fit attempt
    pub max_iterations: usize,
    /// Score below which a fit is flagged low-confidence
    pub gof_threshold: f64,
    /// Seeded perturbed restarts; `None` fits once from the guess
    pub multi_start: Option<MultiStart>,
    /// Attach measured and modeled curves to the record
    pub save_curves: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topology: TopologyChoice::Auto,
            reference_impedance: None,
            frequency_band: None,
            reduction: Reduction::default(),
            weighting: Weighting::default(),
            initial_guess: None,
            tolerance: DEFAULT_FIT_TOL,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            gof_threshold: DEFAULT_GOF_THRESHOLD,
            multi_start: None,
            save_curves: false,
        }
    }
}

impl Config {
    pub(crate) fn fit_settings(&self) -> FitSettings {
        FitSettings {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            weighting: self.weighting,
            multi_start: self.multi_start,
        }
    }

    /// Topologies this run should attempt, in trial order
    pub(crate) fn candidates(&self) -> Vec<CircuitTopology> {
        match self.topology {
            TopologyChoice::Auto => CircuitTopology::ALL.to_vec(),
            TopologyChoice::Fixed(t) => vec![t],
        }
    }
}
