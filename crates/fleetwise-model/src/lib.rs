#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod elastic_net;
pub mod encoder;
pub mod error;
mod frame;
pub mod pipeline;
pub mod router;
pub mod scaler;

pub use elastic_net::{CvConfig, CvScore, ElasticNet, ElasticNetCv, kfold_indices};
pub use encoder::{OneHotEncoder, Vocabulary};
pub use error::{ModelError, Result};
pub use pipeline::{Coefficient, Pipeline, PipelineBuilder, PipelineConfig, Unavailable};
pub use router::{ColumnRouting, route};
pub use scaler::{ColumnScale, StandardScaler};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
