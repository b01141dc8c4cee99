//! Calendar features - cyclic encoding of the reporting month

pub mod month;

pub use month::{MonthCycleFeature, parse_month};
