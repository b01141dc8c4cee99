#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fleet;

// Re-export main types from sub-crates
pub use fleetwise_etl as etl;
pub use fleetwise_features as features;
pub use fleetwise_model as model;
pub use fleetwise_runtime as runtime;

// Re-export common fleet types
pub use fleet::{FLEET_COLUMNS, FleetError, load_fleet, validate_fleet_schema};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
