//! Client errors

use notetree_domain::DomainError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The store rejected the call (validation, missing record, server failure)
    Domain(DomainError),
    /// Network failure or timeout; the same call may succeed if re-submitted
    Transient(String),
    /// The same action is still in flight
    Busy(String),
    /// The response could not be understood
    Decode(String),
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Domain(DomainError::NotFound(_)))
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        ClientError::Domain(err)
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Domain(err) => write!(f, "{}", err),
            ClientError::Transient(msg) => write!(f, "Network error: {}", msg),
            ClientError::Busy(action) => write!(f, "Already in progress: {}", action),
            ClientError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}
