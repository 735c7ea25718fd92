use thiserror::Error;

use crate::render::RenderError;
use crate::submission::RecordId;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a form field that is missing, malformed or out of range.
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Represents a request for a submission that was never stored.
    #[error("No submission with ID {0}")]
    NotFound(RecordId),

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a store that can no longer be used.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Represents an error reading or writing CSV.
    #[error("CSV error")]
    Csv { source: csv::Error },

    /// Represents a report that could not be rendered even in its
    /// minimal form.
    #[error("Rendering failed")]
    Render { source: RenderError },

    /// Represents a form submission that could not be decoded at all.
    #[error("Malformed form submission")]
    MalformedFormSubmission,
}

impl BackendError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        BackendError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
