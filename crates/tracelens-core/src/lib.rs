//! Shared foundations for the tracelens analyzers.
//!
//! Holds the error taxonomy, command-line settings, the named threshold
//! tables that drive classification and advisories, and number formatting.

pub mod error;
pub mod formatting;
pub mod settings;
pub mod thresholds;

pub use error::{AnalyzerError, Result};
