//! Plain-text renderers for trace and harvest aggregates.
//!
//! Each view is a [`std::fmt::Display`] adapter over a finished snapshot, so
//! rendering never mutates or re-sorts the aggregates themselves.

pub mod harvest_view;
mod text;
pub mod trace_view;

pub use harvest_view::HarvestReport;
pub use trace_view::TraceReport;
