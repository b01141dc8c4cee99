//! Column names shared by the fleet feature set.

/// Distance driven per record.
pub const MILEAGE: &str = "Mileage (km)";
/// Fuel consumed per record.
pub const FUEL_USED: &str = "Fuel Used (L)";
/// Maintenance spend per record.
pub const MAINTENANCE_COST: &str = "Maintenance Cost (€)";
/// Number of trips per record.
pub const TOTAL_TRIPS: &str = "Total Trips";
/// Reporting month (date, `YYYY-MM`, month name or number).
pub const MONTH: &str = "Month";

/// Mileage divided by trip count.
pub const AVG_TRIP_DISTANCE: &str = "Avg Trip Distance (km)";
/// Fuel divided by trip count.
pub const FUEL_PER_TRIP: &str = "Fuel per Trip (L)";
/// Maintenance cost divided by mileage.
pub const MAINTENANCE_PER_KM: &str = "Maintenance per km (€)";
/// Month of year, 1 to 12.
pub const MONTH_NUM: &str = "Month_Num";
/// Sine of the month angle.
pub const MONTH_SIN: &str = "Month_sin";
/// Cosine of the month angle.
pub const MONTH_COS: &str = "Month_cos";
/// 1.0 when the month could not be determined.
pub const MONTH_UNKNOWN: &str = "Month_Unknown";

/// Every column produced by the default feature set.
pub const DERIVED_COLUMNS: [&str; 7] = [
    AVG_TRIP_DISTANCE,
    FUEL_PER_TRIP,
    MAINTENANCE_PER_KM,
    MONTH_NUM,
    MONTH_SIN,
    MONTH_COS,
    MONTH_UNKNOWN,
];
