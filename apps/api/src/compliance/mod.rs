//! Post-generation compliance scoring.

pub mod validator;

pub use validator::{validate, ComplianceReport, ComplianceTier, DomainReport, ElementResult};
