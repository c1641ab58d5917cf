//! SQLite implementation of the statement source and score sink.
//!
//! Statement tables hold REAL values; score tables hold TEXT in canonical
//! form, matching what the diff layer compares. Table and column names are
//! interpolated into SQL, so every identifier is validated first.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool};
use tracing::debug;

use ranking_core::{
    LineItemRow, PanelRow, RankingError, ScoreSink, Sector, StatementSource, UpstreamScoreRow,
};

use crate::tables;

/// Shared pool over the ranking database.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self, RankingError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the sink tables if they don't exist. Statement tables and the
    /// upstream score table are loaded by the extraction jobs and are not
    /// created here.
    pub async fn init_schema(&self) -> Result<(), RankingError> {
        let sinks: [(&str, &[&str]); 5] = [
            (tables::FINAL_TABLE, tables::FINAL_COLUMNS_ALL),
            (tables::TTM_INSURANCE_TABLE, tables::TTM_INSURANCE_COLUMNS),
            (tables::RATIO_INSURANCE_TABLE, tables::RATIO_INSURANCE_COLUMNS),
            (tables::MIX_SECURITIES_TABLE, tables::MIX_SECURITIES_COLUMNS),
            (tables::RATIO_SECURITIES_TABLE, tables::RATIO_SECURITIES_COLUMNS),
        ];
        for (table, columns) in sinks {
            let ddl = create_table_sql(table, columns)?;
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Statement tables are loaded by the extraction jobs, so a fetch failure
    /// here points at the source side, not at this store's own tables.
    async fn fetch_statement(&self, table: &str) -> Result<Vec<PanelRow>, RankingError> {
        let table = checked_ident(table)?;
        let sql = format!("SELECT * FROM {table}");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RankingError::External(format!("{table}: {e}")))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let symbol: String = row.try_get("symbol").map_err(|e| key_error("symbol", e))?;
            let year: i64 = row.try_get("year").map_err(|e| key_error("year", e))?;
            let quarter: i64 = row.try_get("quarter").map_err(|e| key_error("quarter", e))?;
            let mut panel_row = PanelRow::new(symbol, year as i32, quarter as u8);
            for column in row.columns() {
                let name = column.name();
                if matches!(name, "symbol" | "year" | "quarter") {
                    continue;
                }
                let value: Option<f64> = row.try_get(name)?;
                panel_row.set(name, value);
            }
            out.push(panel_row);
        }
        Ok(out)
    }
}

#[async_trait]
impl StatementSource for SqliteStore {
    async fn income_statement(&self, sector: Sector) -> Result<Vec<PanelRow>, RankingError> {
        self.fetch_statement(&format!("statement_income_{sector}"))
            .await
    }

    async fn balance_sheet(&self, sector: Sector) -> Result<Vec<PanelRow>, RankingError> {
        self.fetch_statement(&format!("statement_balance_{sector}"))
            .await
    }

    async fn line_items(
        &self,
        symbol: &str,
        item_code: i64,
    ) -> Result<Vec<LineItemRow>, RankingError> {
        let rows = sqlx::query(
            "SELECT year, quarter, value FROM statement_line_items
             WHERE symbol = ? AND item_code = ?
             ORDER BY year, quarter",
        )
        .bind(symbol)
        .bind(item_code)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RankingError::External(format!("statement_line_items: {e}")))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let year: i64 = row.try_get("year")?;
            let quarter: i64 = row.try_get("quarter")?;
            let value: Option<f64> = row.try_get("value")?;
            out.push(LineItemRow {
                symbol: symbol.to_string(),
                year: year as i32,
                quarter: quarter as u8,
                value,
            });
        }
        Ok(out)
    }

    async fn sector_symbols(&self, sector: Sector) -> Result<Vec<String>, RankingError> {
        let rows = sqlx::query("SELECT symbol FROM sector_companies WHERE sector = ? ORDER BY symbol")
            .bind(sector.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RankingError::External(format!("sector_companies: {e}")))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("symbol").map_err(RankingError::from))
            .collect()
    }
}

#[async_trait]
impl ScoreSink for SqliteStore {
    async fn read_rows(
        &self,
        table: &str,
        columns: &[&str],
    ) -> Result<Vec<Vec<String>>, RankingError> {
        let table = checked_ident(table)?;
        let column_list = joined_idents(columns)?;
        let sql = format!("SELECT {column_list} FROM {table}");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(columns.len());
            for (i, _) in columns.iter().enumerate() {
                let value: Option<String> = row.try_get(i)?;
                values.push(value.unwrap_or_default());
            }
            out.push(values);
        }
        Ok(out)
    }

    async fn insert_rows(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<String>],
    ) -> Result<usize, RankingError> {
        let table = checked_ident(table)?;
        let column_list = joined_idents(columns)?;
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!("INSERT INTO {table} ({column_list}) VALUES ({placeholders})");

        let mut inserted = 0usize;
        for row in rows {
            if row.len() != columns.len() {
                return Err(RankingError::InvalidData(format!(
                    "row width {} does not match {} columns for {table}",
                    row.len(),
                    columns.len()
                )));
            }
            let mut query = sqlx::query(&sql);
            for value in row {
                query = query.bind(value);
            }
            // Row-at-a-time so a failure partway leaves earlier rows durable.
            query.execute(&self.pool).await?;
            inserted += 1;
        }
        debug!(table, inserted, "inserted rows");
        Ok(inserted)
    }

    async fn upstream_scores(&self) -> Result<Vec<UpstreamScoreRow>, RankingError> {
        let sql = format!("SELECT * FROM {}", tables::UPSTREAM_TABLE);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(symbol) = text_cell(&row, "symbol").filter(|s| !s.is_empty()) else {
                continue;
            };
            let (Some(year), Some(quarter)) = (int_cell(&row, "year"), int_cell(&row, "quarter"))
            else {
                debug!(symbol = %symbol, "upstream row with unparsable period, skipped");
                continue;
            };
            out.push(UpstreamScoreRow {
                symbol,
                year: year as i32,
                quarter: quarter as u8,
                score_eps_above_average: number_cell(&row, "score_eps_above_average"),
                score_eps_growth: number_cell(&row, "score_eps_growth"),
                score_eps_above_sector: number_cell(&row, "score_eps_above_sector"),
                score_eps_above_group: number_cell(&row, "score_eps_above_group"),
                score_growth: number_cell(&row, "score_growth"),
                rank_growth: text_cell(&row, "rank_growth").unwrap_or_default(),
                score_pe_5y: number_cell(&row, "score_pe_5y"),
                score_pb_5y: number_cell(&row, "score_pb_5y"),
                score_pe_sector: number_cell(&row, "score_pe_sector"),
                score_pb_sector: number_cell(&row, "score_pb_sector"),
                score_valuation: number_cell(&row, "score_valuation"),
                rank_valuation: text_cell(&row, "rank_valuation").unwrap_or_default(),
                score_roe_sector: number_cell(&row, "score_roe_sector"),
                score_roa_sector: number_cell(&row, "score_roa_sector"),
                score_nim_sector: number_cell(&row, "score_nim_sector"),
                z_loan_provision_ratio: number_cell(&row, "z_loan_provision_ratio"),
                z_deposit_to_loan: number_cell(&row, "z_deposit_to_loan"),
                z_npl_ratio_inv: number_cell(&row, "z_npl_ratio_inv"),
                z_npl_coverage: number_cell(&row, "z_npl_coverage"),
                score_health: number_cell(&row, "score_health"),
                rank_health: text_cell(&row, "rank_health").unwrap_or_default(),
            });
        }
        Ok(out)
    }
}

/// All persisted score fields are TEXT; absent columns and empty or
/// unparsable cells read back as `None`.
fn number_cell(row: &SqliteRow, name: &str) -> Option<f64> {
    text_cell(row, name)?.trim().parse().ok()
}

fn int_cell(row: &SqliteRow, name: &str) -> Option<i64> {
    text_cell(row, name)?.trim().parse().ok()
}

fn text_cell(row: &SqliteRow, name: &str) -> Option<String> {
    row.try_get::<Option<String>, _>(name).ok().flatten()
}

/// A statement table without its key columns is a schema defect worth naming,
/// not a generic database error.
fn key_error(name: &str, err: sqlx::Error) -> RankingError {
    match err {
        sqlx::Error::ColumnNotFound(_) => RankingError::MissingColumn(name.to_string()),
        other => RankingError::Database(other),
    }
}

fn valid_ident(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn checked_ident(name: &str) -> Result<&str, RankingError> {
    if valid_ident(name) {
        Ok(name)
    } else {
        Err(RankingError::InvalidData(format!(
            "invalid SQL identifier: {name}"
        )))
    }
}

fn joined_idents(names: &[&str]) -> Result<String, RankingError> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        out.push(checked_ident(name)?);
    }
    Ok(out.join(", "))
}

fn create_table_sql(table: &str, columns: &[&str]) -> Result<String, RankingError> {
    let table = checked_ident(table)?;
    let mut defs = Vec::new();
    for name in tables::with_update(columns) {
        defs.push(format!("{} TEXT", checked_ident(name)?));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        defs.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        // One connection: each :memory: connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn insert_then_read_round_trips() {
        let store = memory_store().await;
        store.init_schema().await.unwrap();

        let columns = tables::with_update(tables::TTM_INSURANCE_COLUMNS);
        let row = vec![
            "AAA".to_string(),
            "2023".to_string(),
            "1".to_string(),
            "10.5".to_string(),
            "".to_string(),
            "100".to_string(),
            "20230704".to_string(),
        ];
        let inserted = store
            .insert_rows(tables::TTM_INSURANCE_TABLE, &columns, &[row.clone()])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let read = store
            .read_rows(tables::TTM_INSURANCE_TABLE, tables::TTM_INSURANCE_COLUMNS)
            .await
            .unwrap();
        assert_eq!(read, vec![row[..6].to_vec()]);
    }

    #[tokio::test]
    async fn rejects_malformed_identifiers() {
        let store = memory_store().await;
        let result = store.read_rows("scores; DROP TABLE x", &["symbol"]).await;
        assert!(matches!(result, Err(RankingError::InvalidData(_))));
    }

    #[tokio::test]
    async fn statement_rows_become_panel_rows() {
        let store = memory_store().await;
        sqlx::query(
            "CREATE TABLE statement_income_insurance (
                symbol TEXT, year INTEGER, quarter INTEGER, net_income REAL, revenues REAL
            )",
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query("INSERT INTO statement_income_insurance VALUES ('AAA', 2023, 1, 5.0, NULL)")
            .execute(store.pool())
            .await
            .unwrap();

        let rows = store.income_statement(Sector::Insurance).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key(), ("AAA", 2023, 1));
        assert_eq!(rows[0].get("net_income"), Some(5.0));
        assert_eq!(rows[0].get("revenues"), None);
    }

    #[tokio::test]
    async fn statement_without_key_columns_names_the_missing_one() {
        let store = memory_store().await;
        sqlx::query("CREATE TABLE statement_income_insurance (ticker TEXT, net_income REAL)")
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO statement_income_insurance VALUES ('AAA', 5.0)")
            .execute(store.pool())
            .await
            .unwrap();

        let err = store.income_statement(Sector::Insurance).await.unwrap_err();
        assert!(matches!(err, RankingError::MissingColumn(ref name) if name == "symbol"));
    }

    #[tokio::test]
    async fn absent_statement_table_reads_as_source_failure() {
        let store = memory_store().await;
        let err = store.balance_sheet(Sector::Securities).await.unwrap_err();
        assert!(matches!(err, RankingError::External(_)));
    }

    #[tokio::test]
    async fn line_items_filter_by_symbol_and_code() {
        let store = memory_store().await;
        sqlx::query(
            "CREATE TABLE statement_line_items (
                symbol TEXT, year INTEGER, quarter INTEGER, item_code INTEGER, value REAL
            )",
        )
        .execute(store.pool())
        .await
        .unwrap();
        for (symbol, code, value) in [("AAA", 411920, 7.0), ("AAA", 21001, 3.0), ("BBB", 411920, 9.0)] {
            sqlx::query("INSERT INTO statement_line_items VALUES (?, 2023, 1, ?, ?)")
                .bind(symbol)
                .bind(code)
                .bind(value)
                .execute(store.pool())
                .await
                .unwrap();
        }

        let items = store.line_items("AAA", 411920).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value, Some(7.0));
    }

    #[tokio::test]
    async fn upstream_scores_parse_text_cells() {
        let store = memory_store().await;
        sqlx::query(
            "CREATE TABLE stock_fundamental_score (
                symbol TEXT, year TEXT, quarter TEXT,
                score_eps_above_average TEXT, score_eps_growth TEXT,
                score_eps_above_sector TEXT, score_eps_above_group TEXT,
                score_growth TEXT, rank_growth TEXT,
                score_pe_5y TEXT, score_pb_5y TEXT,
                score_pe_sector TEXT, score_pb_sector TEXT,
                score_valuation TEXT, rank_valuation TEXT
            )",
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO stock_fundamental_score VALUES
             ('AAA', '2023', '1', '1', '0', '1', '1', '3', 'A', '1', '1', '0', '1', '3', 'A'),
             ('BBB', '2023', 'x', '', '', '', '', '', '', '', '', '', '', '', '')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let rows = store.upstream_scores().await.unwrap();
        // The row with an unparsable quarter is skipped.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "AAA");
        assert_eq!(rows[0].score_growth, Some(3.0));
        assert_eq!(rows[0].rank_growth, "A");
        // Columns absent from the table read as undefined.
        assert_eq!(rows[0].score_health, None);
        assert_eq!(rows[0].rank_health, "");
    }
}
