//! Command families exposed by the `riskkb` binary.

pub mod add_domain;
pub mod links;
pub mod report;
pub mod validate;
