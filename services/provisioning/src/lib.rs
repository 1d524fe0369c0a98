pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod reporter;
pub mod usecase;
