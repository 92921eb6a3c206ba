//! Output record assembly
//!
//! An `ExtractionRecord` is the immutable end product of one run. It
//! serializes for the external reporting collaborators; nothing in this
//! crate mutates it after assembly.

use serde::Serialize;

use crate::fit::{ConvergenceStatus, FitQuality, FitResult};
use crate::math::conversions::{complex_2_db, complex_2_degree};
use crate::models::impedance;
use crate::network::NetworkResponse;

/// One frequency point of the measured and modeled impedance curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveSample {
    pub frequency_hz: f64,
    pub measured_mag_db: f64,
    pub measured_phase_deg: f64,
    pub model_mag_db: f64,
    pub model_phase_deg: f64,
}

/// Final result of one extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRecord {
    /// Input file name, or the caller-supplied label for in-memory input
    pub source: String,
    /// Winning topology
    pub topology: String,
    /// Fitted resistance (Ohm); `None` when the topology has no R
    pub resistance_ohm: Option<f64>,
    /// Fitted inductance (H); `None` when the topology has no L
    pub inductance_h: Option<f64>,
    /// Fitted capacitance (F); `None` when the topology has no C
    pub capacitance_f: Option<f64>,
    pub rmse: f64,
    pub goodness_of_fit: f64,
    pub low_confidence: bool,
    pub convergence: ConvergenceStatus,
    pub iterations: usize,
    /// Fitted band (Hz), after any sub-band restriction
    pub frequency_start_hz: f64,
    pub frequency_stop_hz: f64,
    pub points_used: usize,
    pub points_dropped: usize,
    /// Measured and modeled curves, present when the run requested them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curves: Option<Vec<CurveSample>>,
}

impl ExtractionRecord {
    /// Assemble the record for a scored fit
    pub(crate) fn assemble(
        source: &str,
        response: &NetworkResponse,
        result: &FitResult,
        quality: &FitQuality,
        save_curves: bool,
    ) -> Self {
        let (use_r, use_l, use_c) = result.topology.active();
        let (f_start, f_stop) = response.freq_range();

        let curves = save_curves.then(|| {
            response
                .points()
                .iter()
                .map(|p| {
                    let model = impedance(result.topology, &result.params, p.freq_hz);
                    CurveSample {
                        frequency_hz: p.freq_hz,
                        measured_mag_db: complex_2_db(p.value),
                        measured_phase_deg: complex_2_degree(p.value),
                        model_mag_db: complex_2_db(model),
                        model_phase_deg: complex_2_degree(model),
                    }
                })
                .collect()
        });

        Self {
            source: source.to_string(),
            topology: result.topology.name().to_string(),
            resistance_ohm: use_r.then_some(result.params.r),
            inductance_h: use_l.then_some(result.params.l),
            capacitance_f: use_c.then_some(result.params.c),
            rmse: quality.rmse,
            goodness_of_fit: quality.goodness_of_fit,
            low_confidence: quality.low_confidence,
            convergence: result.status,
            iterations: result.iterations,
            frequency_start_hz: f_start,
            frequency_stop_hz: f_stop,
            points_used: response.points().len(),
            points_dropped: response.dropped(),
            curves,
        }
    }
}
