//! Pipeline configuration loaded from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filter::DirectionAllowList;
use crate::table::ColumnSchema;
use crate::validate::ErrorCodeTable;

pub const DEFAULT_BASE_URL: &str = "https://www.wienerlinien.at/ogd_realtime";

/// Everything one poll cycle needs besides the response itself.
///
/// Stored as JSON on disk; every key is optional:
/// ```json
/// {
///   "base_url": "https://www.wienerlinien.at/ogd_realtime",
///   "stops": ["4205", "4210"],
///   "error_codes": {"311": "DB not available"},
///   "column_schema": ["API_ServerTime", "StopName", "RBL", "LineID", "Direction", "TimePlanned", "TimeReal"],
///   "directions": ["1"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub base_url: String,
    /// RBL numbers queried in one monitor request.
    pub stops: Vec<String>,
    pub error_codes: ErrorCodeTable,
    pub column_schema: ColumnSchema,
    pub directions: DirectionAllowList,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stops: Vec::new(),
            error_codes: ErrorCodeTable::wiener_linien(),
            column_schema: ColumnSchema::default(),
            directions: ["1", "2"].into_iter().collect(),
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid config file '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
