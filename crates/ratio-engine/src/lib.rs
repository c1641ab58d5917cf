//! Ratio calculators: derive sector-specific financial ratios from raw
//! statement fields. Two numeric patterns drive everything here: trailing
//! window aggregates over each company's time series, and period-over-period
//! shifts for averaging stock values with their year-ago levels.

pub mod insurance;
pub mod profit;
pub mod rolling;
pub mod securities;

pub use rolling::ratio;
