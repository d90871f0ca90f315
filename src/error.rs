//! Error taxonomy for the validate → flatten → filter steps.

/// Failures raised by the transform core. Every variant is returned to the
/// caller as-is; nothing here is retried or swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Non-200 status listed in the provider's error code table.
    #[error("call not successful due to a provider-defined error; code {status}: {reason}")]
    Domain { status: u16, reason: String },

    /// Non-200 status the provider does not document.
    #[error("call not successful and status code not recognized by the provider; code {status}")]
    Unclassified { status: u16 },

    /// A timestamp column held a value that is not an absolute point in time.
    #[error("column '{column}' holds a value that is not a timestamp: '{value}'")]
    MalformedTimestamp { column: String, value: String },

    /// The body is not JSON, or not shaped like a monitor response.
    #[error("malformed monitor payload: {0}")]
    MalformedPayload(String),

    #[error("column schema must name {expected} columns, got {found}")]
    InvalidSchema { expected: usize, found: usize },
}

impl PipelineError {
    /// The HTTP status carried by response-level errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            PipelineError::Domain { status, .. } | PipelineError::Unclassified { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
