//! Structured error types for the riskkb CLI.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Stable error categories for riskkb workflows.
///
/// These categories are intentionally coarse. They describe why a command run
/// failed as a whole; individual knowledge-base defects are reported as
/// [`Finding`](crate::knowledge::Finding) values instead and never abort a scan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KbErrorCategory {
    /// Invalid or unreadable configuration.
    Config,
    /// Missing or mismatched local environment prerequisites.
    Environment,
    /// Invalid user input or semantically invalid request.
    Validation,
    /// Filesystem or general I/O failure.
    Io,
}

/// Structured riskkb error with contextual metadata.
///
/// The formatted display output is intentionally CLI-friendly. Optional
/// `operation`, `target`, and `hint` fields can be attached as the error
/// propagates so failures remain actionable at the point they are shown.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KbError {
    /// High-level error category.
    pub category: KbErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Optional operation name.
    pub operation: Option<String>,
    /// Optional path target.
    pub target: Option<String>,
    /// Optional remediation hint.
    pub hint: Option<String>,
}

/// Convenience result type for riskkb internals.
pub type KbResult<T> = Result<T, KbError>;

impl KbError {
    /// Create an error with the given category and message.
    pub fn new(category: KbErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            operation: None,
            target: None,
            hint: None,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(KbErrorCategory::Config, message)
    }

    /// Create an environment error.
    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(KbErrorCategory::Environment, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(KbErrorCategory::Validation, message)
    }

    /// Create an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(KbErrorCategory::Io, message)
    }

    /// Attach an operation label.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Attach a target path.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.target = Some(path.display().to_string());
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for KbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(operation) = &self.operation {
            write!(f, " [operation: {operation}]")?;
        }
        if let Some(target) = &self.target {
            write!(f, " [target: {target}]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " [hint: {hint}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for KbError {}

impl From<std::io::Error> for KbError {
    fn from(value: std::io::Error) -> Self {
        KbError::io(value.to_string())
    }
}
