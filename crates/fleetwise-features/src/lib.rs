#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod columns;
pub mod cost;
pub mod engineer;
mod ratio;
pub mod registry;
pub mod traits;
pub mod trip;

pub use calendar::{MonthCycleFeature, parse_month};
pub use cost::MaintenancePerKmFeature;
pub use engineer::{FeatureConfig, FeatureEngineer, engineer};
pub use ratio::FillPolicy;
pub use registry::{
    FeatureCategory, FeatureInfo, available_features, create_feature, features_by_category,
    get_feature_info,
};
pub use traits::{DerivedFeature, FeatureError, FeatureKind};
pub use trip::{AvgTripDistanceFeature, FuelPerTripFeature};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
