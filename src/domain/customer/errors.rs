use uuid::Uuid;

// ============================================================================
// Customer Input Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be between {min} and {max} characters, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid customer status: {0}")]
    InvalidStatus(String),
}

// ============================================================================
// Customer Service Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Customer with email {0} already exists")]
    EmailConflict(String),

    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    /// Store or infrastructure failure. The message is for operators only.
    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl CustomerError {
    /// Stable label for the error kind, used in metrics and response bodies
    pub fn kind(&self) -> &'static str {
        match self {
            CustomerError::Validation(_) => "validation",
            CustomerError::EmailConflict(_) => "conflict",
            CustomerError::NotFound(_) => "not_found",
            CustomerError::Internal(_) => "internal",
        }
    }
}

pub type CustomerResult<T> = Result<T, CustomerError>;
