//! Touchstone file I/O module
//!
//! Provides reading and writing of 2-port Touchstone (.s2p) files.

pub mod parser;
pub mod writer;

pub use parser::{SParamFormat, Touchstone, TouchstoneError};
