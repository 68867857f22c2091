//! Shared domain model, configuration, and error types for rolodex.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
