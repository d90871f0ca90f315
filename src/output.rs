//! Staging output for departure tables.
//!
//! Supports logging a table as JSON and appending it to a CSV staging file
//! that the downstream loader picks up.

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::table::FlatTable;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Renders a table as a JSON array of objects keyed by the schema's column names.
pub fn to_json(table: &FlatTable) -> Value {
    let names = table.schema().names();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let object: Map<String, Value> = names
                .iter()
                .cloned()
                .zip(row.to_record().into_iter().map(Value::String))
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

/// Logs a table as pretty-printed JSON.
pub fn print_json(table: &FlatTable) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(&to_json(table))?);
    Ok(())
}

/// Appends every row of `table` to a CSV file.
///
/// Creates the file with a header row of the schema's column names if it
/// does not already exist. An empty table still creates the file.
pub fn append_table(path: &str, table: &FlatTable) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = table.len(), "Appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if !file_exists {
        writer.write_record(table.schema().names())?;
    }
    for row in table.rows() {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    Ok(())
}
