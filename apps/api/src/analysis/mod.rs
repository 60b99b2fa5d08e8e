//! Tender analysis: domain activation, question scoring and readiness signals.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod signals;

pub use analyzer::analyze;
pub use models::{ProjectMetadata, TenderAnalysis};
