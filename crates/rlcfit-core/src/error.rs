//! Top-level error type for the extraction pipeline

use thiserror::Error;

use crate::fit::FitError;
use crate::network::ConversionError;
use crate::touchstone::TouchstoneError;

/// Any error that can abort an extraction run
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Touchstone file could not be read or parsed
    #[error(transparent)]
    Touchstone(#[from] TouchstoneError),

    /// Network could not be reduced to a usable impedance response
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Fit could not be started
    #[error(transparent)]
    Fit(#[from] FitError),
}
