//! Error types for custom resource lifecycle handling.

use std::time::Duration;

use thiserror::Error;

use crate::status::ResourceStatus;

/// Error codes for programmatic handling and log filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// SP001: Request type is not Create, Update or Delete
    SP001UnknownRequestType,
    /// SP002: Resource properties missing or invalid
    SP002InvalidProperties,
    /// SP003: Provisioning API call failed
    SP003Provisioning,
    /// SP004: Resource reached a status it cannot recover from
    SP004TerminalStatus,
    /// SP005: Resource is being deleted by another actor
    SP005ConcurrentDelete,
    /// SP006: Not enough execution time left for another poll
    SP006BudgetExhausted,
    /// SP007: Provisioning API response lacked an identifier
    SP007MissingIdentifier,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SP001UnknownRequestType => "SP001",
            Self::SP002InvalidProperties => "SP002",
            Self::SP003Provisioning => "SP003",
            Self::SP004TerminalStatus => "SP004",
            Self::SP005ConcurrentDelete => "SP005",
            Self::SP006BudgetExhausted => "SP006",
            Self::SP007MissingIdentifier => "SP007",
        }
    }
}

/// Errors surfaced by a provisioning API implementation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProvisioningError {
    /// The target record does not exist
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other API failure
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

impl ProvisioningError {
    pub fn api(operation: &'static str, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation,
            code,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Reasons a lifecycle operation ends in a FAILED outcome
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("unknown request type: {0}")]
    UnknownRequestType(String),

    #[error("invalid resource properties: {0}")]
    InvalidProperties(String),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error("resource reported status {0}")]
    TerminalStatus(ResourceStatus),

    #[error("resource is being deleted by another process")]
    ConcurrentDelete,

    #[error(
        "execution time budget exhausted ({}ms left, {}ms needed for another poll)",
        remaining.as_millis(),
        required.as_millis()
    )]
    BudgetExhausted {
        remaining: Duration,
        required: Duration,
    },

    #[error("{0} response did not include an identifier")]
    MissingIdentifier(&'static str),
}

impl LifecycleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownRequestType(_) => ErrorCode::SP001UnknownRequestType,
            Self::InvalidProperties(_) => ErrorCode::SP002InvalidProperties,
            Self::Provisioning(_) => ErrorCode::SP003Provisioning,
            Self::TerminalStatus(_) => ErrorCode::SP004TerminalStatus,
            Self::ConcurrentDelete => ErrorCode::SP005ConcurrentDelete,
            Self::BudgetExhausted { .. } => ErrorCode::SP006BudgetExhausted,
            Self::MissingIdentifier(_) => ErrorCode::SP007MissingIdentifier,
        }
    }

    /// Whether the failure came from a NotFound-class provisioning error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Provisioning(err) if err.is_not_found())
    }
}

/// Failure to deliver the outcome to the orchestrator
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to deliver response: {0}")]
    Delivery(String),

    #[error("response endpoint rejected outcome with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result type alias for LifecycleError
pub type Result<T> = std::result::Result<T, LifecycleError>;
