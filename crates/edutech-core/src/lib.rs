//! Ambient plumbing shared by the Edutech tools: environment configuration,
//! tracing setup and serde helpers.

pub mod config;
pub mod serde;
pub mod tracing;
