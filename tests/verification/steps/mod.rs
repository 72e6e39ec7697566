//! Step definitions for readiness verification scenarios.

pub mod common;
pub mod pod_logs;
pub mod pod_readiness;
pub mod resource_conditions;
