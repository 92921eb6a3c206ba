//! Core TwoPort struct and constructors

use ndarray::Array3;
use num_complex::Complex64;

use crate::frequency::Frequency;
use crate::touchstone::Touchstone;

/// A two-port electrical network measured over a frequency sweep
#[derive(Debug, Clone)]
pub struct TwoPort {
    /// Frequency data
    pub frequency: Frequency,
    /// S-parameter data, shape [nfreq, 2, 2]
    pub s: Array3<Complex64>,
    /// Reference impedance (Ohm)
    pub z0: f64,
    /// Network name, usually the source file stem
    pub name: Option<String>,
}

impl TwoPort {
    /// Create a new TwoPort from S-parameters
    pub fn new(frequency: Frequency, s: Array3<Complex64>, z0: f64) -> Self {
        Self {
            frequency,
            s,
            z0,
            name: None,
        }
    }

    /// Create from parsed Touchstone data
    ///
    /// # Arguments
    /// * `ts` - Parsed Touchstone file
    /// * `z0_override` - Reference impedance override from configuration;
    ///   the file's value is used when `None`
    pub fn from_touchstone(ts: &Touchstone, z0_override: Option<f64>) -> Self {
        Self {
            frequency: ts.frequency.clone(),
            s: ts.s.clone(),
            z0: z0_override.unwrap_or(ts.z0),
            name: None,
        }
    }

    /// Get the number of frequency points
    #[inline]
    pub fn nfreq(&self) -> usize {
        self.s.shape()[0]
    }

    /// Get the S-matrix entries at a frequency index as (s11, s12, s21, s22)
    #[inline]
    pub fn s_at(&self, k: usize) -> (Complex64, Complex64, Complex64, Complex64) {
        (
            self.s[[k, 0, 0]],
            self.s[[k, 0, 1]],
            self.s[[k, 1, 0]],
            self.s[[k, 1, 1]],
        )
    }
}
