pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod flatten;
pub mod monitor;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod response;
pub mod table;
pub mod validate;

pub use error::PipelineError;
pub use filter::{DirectionAllowList, filter_directions};
pub use flatten::flatten;
pub use pipeline::run;
pub use table::{ColumnSchema, FlatRow, FlatTable};
pub use validate::{ErrorCodeTable, validate};
