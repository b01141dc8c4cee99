//! Feature Registry
//!
//! Central registry for the derived features. Allows feature lookup and
//! instantiation by name.

use crate::calendar::MonthCycleFeature;
use crate::columns::*;
use crate::cost::MaintenancePerKmFeature;
use crate::traits::DerivedFeature;
use crate::trip::{AvgTripDistanceFeature, FuelPerTripFeature};
use std::collections::HashMap;
use std::fmt;

/// Available feature categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureCategory {
    /// Per-trip averages
    Trip,
    /// Spend normalized by usage
    Cost,
    /// Seasonality encodings
    Calendar,
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trip => write!(f, "trip"),
            Self::Cost => write!(f, "cost"),
            Self::Calendar => write!(f, "calendar"),
        }
    }
}

/// Feature metadata
#[derive(Debug, Clone)]
pub struct FeatureInfo {
    /// Feature name (unique identifier)
    pub name: &'static str,
    /// Feature category
    pub category: FeatureCategory,
    /// Brief description of what the feature measures
    pub description: &'static str,
    /// Required column names in input data
    pub required_columns: &'static [&'static str],
    /// Columns the feature writes
    pub output_columns: &'static [&'static str],
}

/// Get all available feature info
pub fn available_features() -> Vec<FeatureInfo> {
    vec![
        FeatureInfo {
            name: "avg_trip_distance",
            category: FeatureCategory::Trip,
            description: "Mileage per trip, median-filled where trips are zero or unknown",
            required_columns: &[MILEAGE, TOTAL_TRIPS],
            output_columns: &[AVG_TRIP_DISTANCE],
        },
        FeatureInfo {
            name: "fuel_per_trip",
            category: FeatureCategory::Trip,
            description: "Fuel used per trip, median-filled where trips are zero or unknown",
            required_columns: &[FUEL_USED, TOTAL_TRIPS],
            output_columns: &[FUEL_PER_TRIP],
        },
        FeatureInfo {
            name: "maintenance_per_km",
            category: FeatureCategory::Cost,
            description: "Maintenance cost per kilometre, zero where mileage is zero or unknown",
            required_columns: &[MAINTENANCE_COST, MILEAGE],
            output_columns: &[MAINTENANCE_PER_KM],
        },
        FeatureInfo {
            name: "month_cycle",
            category: FeatureCategory::Calendar,
            description: "Month number with sine/cosine encoding and an unknown-month flag",
            required_columns: &[MONTH],
            output_columns: &[MONTH_NUM, MONTH_SIN, MONTH_COS, MONTH_UNKNOWN],
        },
    ]
}

/// Get features by category
pub fn features_by_category(category: FeatureCategory) -> Vec<FeatureInfo> {
    available_features()
        .into_iter()
        .filter(|f| f.category == category)
        .collect()
}

/// Get feature info by name
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    available_features().into_iter().find(|f| f.name == name)
}

/// Get a map of all features indexed by name
pub fn feature_map() -> HashMap<&'static str, FeatureInfo> {
    available_features()
        .into_iter()
        .map(|f| (f.name, f))
        .collect()
}

/// List all feature names
pub fn list_feature_names() -> Vec<&'static str> {
    available_features().into_iter().map(|f| f.name).collect()
}

/// Count features by category
pub fn count_by_category() -> HashMap<FeatureCategory, usize> {
    let mut counts = HashMap::new();
    for feature in available_features() {
        *counts.entry(feature.category).or_insert(0) += 1;
    }
    counts
}

/// Instantiate a feature with its default configuration
pub fn create_feature(name: &str) -> Option<Box<dyn DerivedFeature>> {
    match name {
        "avg_trip_distance" => Some(Box::new(AvgTripDistanceFeature::default())),
        "fuel_per_trip" => Some(Box::new(FuelPerTripFeature::default())),
        "maintenance_per_km" => Some(Box::new(MaintenancePerKmFeature::default())),
        "month_cycle" => Some(Box::new(MonthCycleFeature::default())),
        _ => None,
    }
}
