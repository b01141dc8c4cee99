//! Cost features - spend normalized by usage

pub mod maintenance_per_km;

pub use maintenance_per_km::MaintenancePerKmFeature;
