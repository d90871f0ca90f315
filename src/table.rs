//! The flat, relational shape the monitor payload is reduced to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Number of columns in a [`FlatRow`].
pub const COLUMN_COUNT: usize = 7;

/// Field positions within a row, in [`FlatRow`] order.
pub const SERVER_TIME: usize = 0;
pub const STOP_NAME: usize = 1;
pub const STOP_ID: usize = 2;
pub const LINE_ID: usize = 3;
pub const DIRECTION: usize = 4;
pub const TIME_PLANNED: usize = 5;
pub const TIME_REAL: usize = 6;

/// Column names used when the caller supplies none.
pub const DEFAULT_COLUMNS: [&str; COLUMN_COUNT] = [
    "API_ServerTime",
    "StopName",
    "RBL",
    "LineID",
    "Direction",
    "TimePlanned",
    "TimeReal",
];

/// Ordered column names for the target table. Position `i` names field `i`
/// of [`FlatRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ColumnSchema {
    names: [String; COLUMN_COUNT],
}

impl ColumnSchema {
    pub fn new<S: Into<String>>(names: Vec<S>) -> Result<Self, PipelineError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let found = names.len();
        let names: [String; COLUMN_COUNT] =
            names
                .try_into()
                .map_err(|_| PipelineError::InvalidSchema {
                    expected: COLUMN_COUNT,
                    found,
                })?;
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, position: usize) -> &str {
        &self.names[position]
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            names: DEFAULT_COLUMNS.map(String::from),
        }
    }
}

impl TryFrom<Vec<String>> for ColumnSchema {
    type Error = PipelineError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<ColumnSchema> for Vec<String> {
    fn from(schema: ColumnSchema) -> Self {
        schema.names.into()
    }
}

/// The next departure at one stop, as observed at `server_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRow {
    pub server_time: DateTime<Utc>,
    pub stop_name: String,
    pub stop_id: String,
    pub line_id: String,
    pub direction: String,
    pub time_planned: Option<DateTime<Utc>>,
    pub time_real: Option<DateTime<Utc>>,
}

impl FlatRow {
    /// The row rendered as text cells in column order. Timestamps are
    /// RFC 3339, absent times are empty.
    pub fn to_record(&self) -> [String; COLUMN_COUNT] {
        let ts = |t: &Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();

        let mut record: [String; COLUMN_COUNT] = Default::default();
        record[SERVER_TIME] = self.server_time.to_rfc3339();
        record[STOP_NAME] = self.stop_name.clone();
        record[STOP_ID] = self.stop_id.clone();
        record[LINE_ID] = self.line_id.clone();
        record[DIRECTION] = self.direction.clone();
        record[TIME_PLANNED] = ts(&self.time_planned);
        record[TIME_REAL] = ts(&self.time_real);
        record
    }
}

/// Rows sharing one [`ColumnSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTable {
    schema: ColumnSchema,
    rows: Vec<FlatRow>,
}

impl FlatTable {
    pub fn new(schema: ColumnSchema, rows: Vec<FlatRow>) -> Self {
        Self { schema, rows }
    }

    pub fn empty(schema: ColumnSchema) -> Self {
        Self::new(schema, Vec::new())
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FlatRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
