//! The API call result handed to the validator.

use serde_json::Value;

use crate::error::PipelineError;

/// A completed API call: a status code and a body that is decoded on demand.
pub trait ApiResponse {
    fn status_code(&self) -> u16;

    /// Decodes the body as JSON.
    fn json(&self) -> Result<Value, PipelineError>;
}

/// A response captured from the wire: status plus the raw body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl ApiResponse for HttpResponse {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn json(&self) -> Result<Value, PipelineError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| PipelineError::MalformedPayload(format!("body is not JSON: {e}")))
    }
}
