//! Extraction pipeline
//!
//! Ties the crate together: parse a Touchstone file, reduce it to a
//! complex impedance response, fit one or more circuit topologies, score
//! the winner, and assemble an immutable output record.

mod config;
mod pipeline;
mod record;

pub use config::{Config, TopologyChoice};
pub use pipeline::{extract_file, extract_str};
pub use record::{CurveSample, ExtractionRecord};
