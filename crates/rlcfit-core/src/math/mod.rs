//! Mathematical functions module
//!
//! Provides complex value conversions used by the Touchstone codec and the
//! curve export layer.

pub mod conversions;

pub use conversions::*;
