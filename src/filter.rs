//! Keeps only the rows heading in configured directions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::FlatTable;

/// Direction identifiers (`richtungsId`) to retain, compared as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectionAllowList(BTreeSet<String>);

impl DirectionAllowList {
    pub fn contains(&self, direction: &str) -> bool {
        self.0.contains(direction)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DirectionAllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Returns the rows whose direction is in `allowed`, in their original order.
///
/// An empty allow-list yields an empty table.
pub fn filter_directions(table: FlatTable, allowed: &DirectionAllowList) -> FlatTable {
    let schema = table.schema().clone();
    let before = table.len();

    let rows: Vec<_> = table
        .into_rows()
        .into_iter()
        .filter(|row| allowed.contains(&row.direction))
        .collect();

    debug!(before, after = rows.len(), "Filtered rows by direction");
    FlatTable::new(schema, rows)
}
