//! Shared runtime services: root resolution, configuration, and error types.

pub mod config;
pub mod context;
pub mod error;
