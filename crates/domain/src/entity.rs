//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Everything except `NotFound` and `Internal` is detected before any
/// write happens, so a failed call never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    /// Malformed or missing input
    Validation(String),
    /// A foreign key (parent or category) that does not resolve
    InvalidReference(String),
    /// A category patched to be its own parent
    SelfParent(String),
    /// A patch that supplies no fields
    NoOp(String),
    NotFound(String),
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        DomainError::Internal(err.to_string())
    }

    /// The bare message, without the kind prefix used by `Display`
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg)
            | DomainError::InvalidReference(msg)
            | DomainError::SelfParent(msg)
            | DomainError::NoOp(msg)
            | DomainError::NotFound(msg)
            | DomainError::Internal(msg) => msg,
        }
    }

    /// True for errors the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::NotFound(_) | DomainError::Internal(_))
    }

    /// Stable wire code carried in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::InvalidReference(_) => "INVALID_REFERENCE",
            DomainError::SelfParent(_) => "SELF_PARENT",
            DomainError::NoOp(_) => "NO_OP",
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Rebuild an error from its wire code; unknown codes become `Internal`
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "VALIDATION_ERROR" => DomainError::Validation(message),
            "INVALID_REFERENCE" => DomainError::InvalidReference(message),
            "SELF_PARENT" => DomainError::SelfParent(message),
            "NO_OP" => DomainError::NoOp(message),
            "NOT_FOUND" => DomainError::NotFound(message),
            _ => DomainError::Internal(message),
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            DomainError::SelfParent(msg) => write!(f, "Invalid parent: {}", msg),
            DomainError::NoOp(msg) => write!(f, "Nothing to update: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_strips_kind() {
        let err = DomainError::validation("Name is required");
        assert_eq!(err.message(), "Name is required");
        assert_eq!(err.to_string(), "Invalid input: Name is required");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(DomainError::NoOp("x".into()).is_client_error());
        assert!(DomainError::SelfParent("x".into()).is_client_error());
        assert!(!DomainError::not_found("x").is_client_error());
        assert!(!DomainError::internal("disk full").is_client_error());
    }

    #[test]
    fn test_wire_code_preserves_kind() {
        let err = DomainError::SelfParent("Category cannot be its own parent".into());
        assert_eq!(DomainError::from_code(err.code(), err.message()), err);
        assert_eq!(
            DomainError::from_code("SOMETHING_NEW", "boom"),
            DomainError::Internal("boom".into())
        );
    }
}
