#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod clean;
pub mod error;
pub mod io;
pub mod normalize;
pub mod schema;

pub use clean::{CleanConfig, DataCleaner, clean, parse_timestamp};
pub use error::{EtlError, Result};
pub use io::{IngestOutput, process_file, read_csv, write_csv};
pub use normalize::{NormalizeMethod, normalize};
pub use schema::{
    ColumnDescriptor, ColumnKind, MANDATORY_COLUMNS, SchemaReport, TIMESTAMP, VEHICLE_ID,
    describe_columns, is_numeric_dtype, numeric_columns, validate_columns, validate_schema,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
