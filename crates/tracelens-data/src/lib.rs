//! Data layer for the tracelens analyzers.
//!
//! Loads Chrome performance traces and harvest JSONL logs, classifies each
//! record into named buckets in a single forward pass, and exposes the
//! finished aggregates read-only to the reporters.

pub mod bucket;
pub mod digest;
pub mod fields;
pub mod harvest;
pub mod reader;
pub mod trace;

pub use tracelens_core as core;
