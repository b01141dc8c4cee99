//! Trip features - per-trip averages of distance and fuel
//!
//! Both divide by the trip count, so a record with zero or unknown trips has
//! no defined per-trip value and is filled with the fleet median instead.

pub mod avg_trip_distance;
pub mod fuel_per_trip;

pub use avg_trip_distance::AvgTripDistanceFeature;
pub use fuel_per_trip::FuelPerTripFeature;
