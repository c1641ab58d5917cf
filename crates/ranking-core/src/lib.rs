//! Core types for the sector ranking engine: the quarterly panel data model,
//! the error taxonomy, and the trait seams toward the statement source and
//! the score sink.

pub mod error;
pub mod panel;
pub mod traits;
pub mod types;

pub use error::RankingError;
pub use panel::{Panel, PanelRow};
pub use traits::{ScoreSink, StatementSource};
pub use types::{
    HealthTier, LineItemRow, Rank, RunContext, ScoreRecord, Sector, UpstreamScoreRow,
};
