use thiserror::Error;

/// A rejected value or an inconsistent invoice state.
///
/// Every core operation reports failures through this single type. The
/// `Display` output is the human message alone, so it can be shown to
/// users or compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Dot-separated path to the offending field (e.g. "buyer.phone").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A required field has not been set.
    pub(crate) fn required(field: impl Into<String>, label: &str) -> Self {
        Self::new(field, format!("{label} is required"))
    }

    /// A numeric field received a negative value.
    pub(crate) fn negative(field: impl Into<String>, label: &str) -> Self {
        Self::new(field, format!("{label} cannot be negative"))
    }
}

/// Shorthand for results produced by invoice sections.
pub type SectionResult<T> = Result<T, ValidationError>;
