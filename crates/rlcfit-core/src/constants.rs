//! Numerical constants for the extraction pipeline
//!
//! Provides standardized tolerance values and defaults used throughout
//! the library.

/// Tolerance for detecting near-zero values in division and singularity checks.
/// Used to prevent division by zero and detect ill-conditioned denominators.
pub const NEAR_ZERO: f64 = 1e-15;

/// Tolerance below which the S-to-Z/Y bilinear mapping is treated as singular
/// at a frequency point and the point is excluded from the response.
pub const SINGULARITY_TOL: f64 = 1e-12;

/// Tolerance for SVD solve in the damped least-squares step of the optimizer.
pub const SVD_TOLERANCE: f64 = 1e-14;

/// Default reference impedance (Ohm) when a Touchstone option line carries
/// no `R` token.
pub const DEFAULT_Z0: f64 = 50.0;

/// Default relative objective-reduction tolerance for optimizer convergence.
pub const DEFAULT_FIT_TOL: f64 = 1e-9;

/// Default iteration cap for the optimizer.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default goodness-of-fit score below which a fit is flagged low-confidence.
pub const DEFAULT_GOF_THRESHOLD: f64 = 0.9;

/// Initial Levenberg-Marquardt damping factor.
pub const LM_LAMBDA_INIT: f64 = 1e-3;

/// Damping factor ceiling; once exceeded no further reduction is possible
/// and the search is treated as settled at a local minimum.
pub const LM_LAMBDA_MAX: f64 = 1e12;

/// Forward-difference step for the finite-difference Jacobian, applied in
/// log-parameter space.
pub const LM_FD_STEP: f64 = 1e-6;
