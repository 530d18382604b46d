use thiserror::Error;

/// Failures surfaced by the context helpers.
///
/// Scoped calls never fail on their own; a body's outcome is forwarded as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// A function observed an ambient value that does not match the
    /// override chain active at its call site.
    #[error("invariant violation: expected {expected}, observed {observed}")]
    InvariantViolation { expected: String, observed: String },

    // Malformed JSON for an ambient value or an override set
    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ContextError>;
