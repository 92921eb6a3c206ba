//! rlcfit-core: lumped RLC equivalent-circuit extraction
//!
//! Derives a lumped-element RLC equivalent circuit from frequency-swept
//! S-parameter measurements of a microstrip structure stored in Touchstone
//! (`.s2p`) format.
//!
//! ## Modules
//!
//! - `frequency` - Frequency band representation
//! - `math` - Mathematical functions (complex value conversions)
//! - `touchstone` - Touchstone file I/O
//! - `network` - Two-port network and S-to-Z/Y conversion
//! - `models` - Closed-form lumped circuit topologies
//! - `fit` - Bounded nonlinear least-squares fitter and fit quality metrics
//! - `extract` - Run configuration, pipeline, and output record assembly

pub mod constants;
pub mod error;
pub mod extract;
pub mod fit;
pub mod frequency;
pub mod math;
pub mod models;
pub mod network;
pub mod touchstone;

pub use error::ExtractError;
pub use extract::{extract_file, extract_str, Config, ExtractionRecord};
pub use frequency::Frequency;
pub use models::{CircuitTopology, ParameterSet};
pub use network::TwoPort;
