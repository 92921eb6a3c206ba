//! Network module - two-port network representation and conversion
//!
//! Provides the `TwoPort` struct built from Touchstone data and the S-to-Z/Y
//! conversion that reduces it to a one-port response for fitting.

mod convert;
mod core;

pub use convert::{convert, ConversionError, NetworkResponse, Reduction, ResponsePoint};
pub use core::TwoPort;
