//! Response validation against the provider's documented error codes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::PipelineError;
use crate::response::ApiResponse;

/// Status codes the provider documents as its own failures, with their reasons.
///
/// Deserializes from a JSON object keyed by the code:
/// ```json
/// { "311": "DB not available", "320": "GET query invalid" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCodeTable {
    entries: BTreeMap<u16, String>,
}

impl ErrorCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The codes listed in the Wiener Linien realtime API documentation.
    pub fn wiener_linien() -> Self {
        [
            (311u16, "DB not available"),
            (312, "stop does not exist"),
            (316, "query limit reached"),
            (320, "GET query invalid"),
            (321, "GET query parameter missing"),
            (322, "no data available"),
        ]
        .into_iter()
        .collect()
    }

    pub fn reason(&self, status: u16) -> Option<&str> {
        self.entries.get(&status).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u16, S)> for ErrorCodeTable {
    fn from_iter<I: IntoIterator<Item = (u16, S)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

/// Checks whether an API call succeeded and returns its JSON body.
///
/// # Errors
///
/// - [`PipelineError::Domain`] when the status is listed in `error_table`.
/// - [`PipelineError::Unclassified`] for any other non-200 status.
/// - [`PipelineError::MalformedPayload`] when a 200 body is not JSON.
pub fn validate<R: ApiResponse + ?Sized>(
    response: &R,
    error_table: &ErrorCodeTable,
) -> Result<Value, PipelineError> {
    let status = response.status_code();

    if status == 200 {
        let body = response.json()?;
        info!(status, "API call successful");
        return Ok(body);
    }

    match error_table.reason(status) {
        Some(reason) => Err(PipelineError::Domain {
            status,
            reason: reason.to_string(),
        }),
        None => Err(PipelineError::Unclassified { status }),
    }
}
