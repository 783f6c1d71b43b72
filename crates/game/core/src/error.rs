//! Error types shared by the engines.
//!
//! Domain-specific errors (e.g., `AccrualError`, `SkillError`) are defined in their
//! respective modules alongside the operations they validate.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each engine has its own error type with specific variants
//! - **Uniform Surface**: Every error maps onto a small [`ErrorKind`] taxonomy so
//!   callers can branch on it without knowing the concrete enum
//! - **No Panics**: Expected business conditions are values, never panics

use std::fmt;

/// How a caller should treat an error: retry later or fix the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Daily cap exhausted, skill on cooldown.
    Recoverable,

    /// Unknown reward source or skill id.
    Validation,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Business-level classification shared by every engine error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Unknown source, skill, or template id.
    NotFound,
    /// A required resource is missing (daily cap, cooldown, live battle).
    PreconditionFailed,
    /// The request was valid but there was nothing to do.
    NoOp,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PreconditionFailed => "precondition_failed",
            Self::NoOp => "no_op",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every engine error so hosts can classify failures
/// without matching on concrete enums.
///
/// Only [`kind`](GameError::kind) is required; severity and code derive
/// from it unless a variant needs something finer.
pub trait GameError: fmt::Display + fmt::Debug {
    /// Returns the taxonomy bucket of this error.
    fn kind(&self) -> ErrorKind;

    fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::NotFound => ErrorSeverity::Validation,
            ErrorKind::PreconditionFailed | ErrorKind::NoOp => ErrorSeverity::Recoverable,
        }
    }

    /// Stable identifier for logs and tests.
    fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// Flat `{success, message}` view of an engine call, for UI layers that only
/// branch on success and print the message.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperationReport<T> {
    pub success: bool,
    pub message: String,
    pub kind: Option<ErrorKind>,
    pub value: Option<T>,
}

impl<T> OperationReport<T> {
    pub fn ok(value: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            kind: None,
            value: Some(value),
        }
    }

    pub fn failed<E: GameError>(error: &E) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            kind: Some(error.kind()),
            value: None,
        }
    }
}

impl<T, E: GameError> From<Result<T, E>> for OperationReport<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::ok(value, "ok"),
            Err(error) => Self::failed(&error),
        }
    }
}
