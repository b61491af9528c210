//! Glue shared by the `analyze_trace` and `analyze_harvest_logs` binaries.

pub mod bootstrap;
pub mod pipeline;
