//! S-parameter to impedance conversion and one-port reduction
//!
//! Converts a measured two-port S-parameter block into the one-port complex
//! impedance the fitter works against. Points where the bilinear S-to-Z/Y
//! mapping is singular (e.g. S11 exactly +1 under the reflection reduction)
//! are excluded with a warning and counted, never propagated as NaN/Inf.

use log::warn;
use num_complex::Complex64;
use serde::Deserialize;
use thiserror::Error;

use super::core::TwoPort;
use crate::constants::SINGULARITY_TOL;

/// Conversion errors
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("no usable frequency points remain after conversion ({dropped} dropped)")]
    EmptyResponse { dropped: usize },
}

/// One-port reduction mode
///
/// How the fitted two-terminal element is assumed to sit in the measured
/// two-port fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reduction {
    /// Element terminates port 1; impedance from the reflection coefficient,
    /// z = z0 (1 + s11) / (1 - s11)
    #[default]
    Reflection,
    /// Element in series between the ports; impedance from Z = -1 / y21
    SeriesThru,
    /// Element in shunt under a thru; impedance from Z = (z0/2) s21 / (1 - s21)
    ShuntThru,
}

/// One retained point of the converted response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsePoint {
    /// Frequency in Hz
    pub freq_hz: f64,
    /// Complex impedance (Ohm)
    pub value: Complex64,
}

/// Converted one-port impedance response
///
/// Immutable once computed; owned by the fitting run that created it.
#[derive(Debug, Clone)]
pub struct NetworkResponse {
    points: Vec<ResponsePoint>,
    dropped: usize,
}

impl NetworkResponse {
    /// Retained (frequency, impedance) points
    #[inline]
    pub fn points(&self) -> &[ResponsePoint] {
        &self.points
    }

    /// Number of retained points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points excluded as singular or non-finite
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Frequency range (Hz) of the retained points
    pub fn freq_range(&self) -> (f64, f64) {
        let first = self.points.first().map_or(0.0, |p| p.freq_hz);
        let last = self.points.last().map_or(0.0, |p| p.freq_hz);
        (first, last)
    }
}

/// Convert a two-port network to a one-port impedance response
///
/// # Arguments
/// * `net` - Measured two-port network
/// * `reduction` - One-port reduction mode
/// * `band` - Optional (start, stop) sub-band in Hz to restrict the fit to;
///   points outside the band are skipped without counting as dropped
pub fn convert(
    net: &TwoPort,
    reduction: Reduction,
    band: Option<(f64, f64)>,
) -> Result<NetworkResponse, ConversionError> {
    let freqs = net.frequency.f();
    let mut points = Vec::with_capacity(net.nfreq());
    let mut dropped = 0usize;

    for k in 0..net.nfreq() {
        let freq_hz = freqs[k];
        if let Some((lo, hi)) = band {
            if freq_hz < lo || freq_hz > hi {
                continue;
            }
        }

        match reduce_point(net, reduction, k) {
            Some(value) if value.is_finite() => points.push(ResponsePoint { freq_hz, value }),
            _ => {
                dropped += 1;
                warn!(
                    "excluding singular conversion point at index {} ({} Hz)",
                    k, freq_hz
                );
            }
        }
    }

    if points.is_empty() {
        return Err(ConversionError::EmptyResponse { dropped });
    }

    Ok(NetworkResponse { points, dropped })
}

/// Evaluate one reduction at one frequency index; None when singular
fn reduce_point(net: &TwoPort, reduction: Reduction, k: usize) -> Option<Complex64> {
    let (s11, s12, s21, s22) = net.s_at(k);
    let z0 = Complex64::new(net.z0, 0.0);
    let one = Complex64::new(1.0, 0.0);

    match reduction {
        Reduction::Reflection => {
            // z = z0 (1 + s11) / (1 - s11), singular at s11 = +1
            let den = one - s11;
            if den.norm() < SINGULARITY_TOL {
                return None;
            }
            Some(z0 * (one + s11) / den)
        }
        Reduction::SeriesThru => {
            let y21 = s2y(s11, s12, s21, s22, net.z0)?.2;
            if y21.norm() < SINGULARITY_TOL {
                return None;
            }
            Some(-one / y21)
        }
        Reduction::ShuntThru => {
            // Ideal shunt fixtures have no Y-matrix, so the reduction works
            // on s21 directly; singular at s21 = +1 (open shunt).
            let den = one - s21;
            if den.norm() < SINGULARITY_TOL {
                return None;
            }
            Some(z0 * 0.5 * s21 / den)
        }
    }
}

/// Closed-form 2x2 S-to-Y conversion at one frequency point
///
/// Bilinear relation Y = G (I - S)(I + S)^-1 G with G = I/sqrt(z0),
/// written out for the fixed 2x2 size. Returns None at singularities
/// of the mapping.
pub fn s2y(
    s11: Complex64,
    s12: Complex64,
    s21: Complex64,
    s22: Complex64,
    z0: f64,
) -> Option<(Complex64, Complex64, Complex64, Complex64)> {
    let one = Complex64::new(1.0, 0.0);
    let y0 = Complex64::new(1.0 / z0, 0.0);

    let den = (one + s11) * (one + s22) - s12 * s21;
    if den.norm() < SINGULARITY_TOL {
        return None;
    }

    let y11 = y0 * ((one - s11) * (one + s22) + s12 * s21) / den;
    let y12 = y0 * (-2.0 * s12) / den;
    let y21 = y0 * (-2.0 * s21) / den;
    let y22 = y0 * ((one + s11) * (one - s22) + s12 * s21) / den;

    Some((y11, y12, y21, y22))
}
