//! Sector scoring engine: converts ratios into peer-relative or
//! threshold-relative scores, and aggregates criterion scores into the four
//! pillar scores and the final letter rank.

pub mod composite;
pub mod peer;
pub mod strategies;

pub use strategies::Direction;
