use async_trait::async_trait;

use crate::panel::PanelRow;
use crate::types::{LineItemRow, Sector, UpstreamScoreRow};
use crate::RankingError;

/// Provider of raw quarterly statement data for one sector. A failure here
/// aborts the sector's run before anything has been written.
#[async_trait]
pub trait StatementSource: Send + Sync {
    async fn income_statement(&self, sector: Sector) -> Result<Vec<PanelRow>, RankingError>;

    async fn balance_sheet(&self, sector: Sector) -> Result<Vec<PanelRow>, RankingError>;

    /// Supplementary statement line items for one company, filtered to one
    /// item code per call.
    async fn line_items(
        &self,
        symbol: &str,
        item_code: i64,
    ) -> Result<Vec<LineItemRow>, RankingError>;

    /// Qualifying company symbols for the sector.
    async fn sector_symbols(&self, sector: Sector) -> Result<Vec<String>, RankingError>;
}

/// Relational sink for scored rows. Reads return the full current contents
/// of a table (the comparison set for incremental diffing); inserts are
/// row-at-a-time with per-row durability, and nothing is ever deleted.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    async fn read_rows(
        &self,
        table: &str,
        columns: &[&str],
    ) -> Result<Vec<Vec<String>>, RankingError>;

    async fn insert_rows(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<String>],
    ) -> Result<usize, RankingError>;

    /// Full contents of the upstream fundamental score table.
    async fn upstream_scores(&self) -> Result<Vec<UpstreamScoreRow>, RankingError>;
}
