// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
