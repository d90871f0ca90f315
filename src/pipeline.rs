//! Chains validation, flattening and direction filtering for one response.

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::filter::{DirectionAllowList, filter_directions};
use crate::flatten::flatten;
use crate::response::ApiResponse;
use crate::table::{ColumnSchema, FlatTable};
use crate::validate::{ErrorCodeTable, validate};

/// Runs validate → flatten → filter. Either the whole transform succeeds or
/// the first error is returned.
pub fn run<R: ApiResponse + ?Sized>(
    response: &R,
    error_table: &ErrorCodeTable,
    schema: &ColumnSchema,
    directions: &DirectionAllowList,
) -> Result<FlatTable, PipelineError> {
    let payload = validate(response, error_table)?;
    let table = flatten(schema, &payload)?;
    let flattened = table.len();
    let table = filter_directions(table, directions);

    info!(flattened, kept = table.len(), "Departure table ready");
    Ok(table)
}

/// [`run`] with the parameters taken from a [`PipelineConfig`].
pub fn run_with_config<R: ApiResponse + ?Sized>(
    response: &R,
    config: &PipelineConfig,
) -> Result<FlatTable, PipelineError> {
    run(
        response,
        &config.error_codes,
        &config.column_schema,
        &config.directions,
    )
}
