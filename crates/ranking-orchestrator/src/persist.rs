//! Row shaping and incremental persistence shared by the sector pipelines.

use ranking_core::{PanelRow, RankingError, RunContext, ScoreRecord, ScoreSink, Sector};
use score_store::{canonical_number, incremental_rows, tables};
use tracing::info;

/// Canonical sink row for one panel row: key columns followed by the named
/// numeric fields.
pub fn panel_values(row: &PanelRow, fields: &[&str]) -> Vec<String> {
    let mut out = vec![
        row.symbol.clone(),
        row.year.to_string(),
        row.quarter.to_string(),
    ];
    out.extend(fields.iter().map(|f| canonical_number(row.get(*f))));
    out
}

/// Canonical composite-table row for one score record, in the sector's
/// column order. Columns not covered by the record's pillar fields are
/// looked up in its criterion map.
pub fn final_row(record: &ScoreRecord, sector: Sector, columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .map(|c| match *c {
            "symbol" => record.symbol.clone(),
            "year" => record.year.to_string(),
            "quarter" => record.quarter.to_string(),
            "sector" => sector.as_str().to_string(),
            "score_profit" => canonical_number(record.score_profit),
            "rank_profit" => record.rank_profit.clone().unwrap_or_default(),
            "score_health" => canonical_number(record.score_health),
            "rank_health" => record.rank_health.clone().unwrap_or_default(),
            "score_growth" => canonical_number(record.score_growth),
            "rank_growth" => record.rank_growth.clone(),
            "score_valuation" => canonical_number(record.score_valuation),
            "rank_valuation" => record.rank_valuation.clone(),
            "score_final" => canonical_number(record.score_final),
            "rank_final" => record.rank_final.clone().unwrap_or_default(),
            name => canonical_number(record.criterion(name)),
        })
        .collect()
}

/// Diffs `fresh` against `persisted`, stamps the accepted rows with the run
/// date, and appends them. Returns the number of inserted rows.
pub async fn persist_increment(
    sink: &dyn ScoreSink,
    table: &str,
    columns: &[&str],
    fresh: &[Vec<String>],
    persisted: &[Vec<String>],
    ctx: &RunContext,
) -> Result<usize, RankingError> {
    let outcome = incremental_rows(fresh, persisted);
    if outcome.stale > 0 {
        info!(table, stale = outcome.stale, "persisted rows not reproduced by this run, kept");
    }
    if outcome.to_insert.is_empty() {
        info!(table, "no new rows");
        return Ok(0);
    }

    let stamp = ctx.update_stamp();
    let rows: Vec<Vec<String>> = outcome
        .to_insert
        .into_iter()
        .map(|mut row| {
            row.push(stamp.clone());
            row
        })
        .collect();
    let columns = tables::with_update(columns);
    let inserted = sink.insert_rows(table, &columns, &rows).await?;
    info!(table, inserted, "inserted new rows");
    Ok(inserted)
}

/// `persist_increment` against the table's full current contents.
pub async fn persist_table(
    sink: &dyn ScoreSink,
    table: &str,
    columns: &[&str],
    fresh: &[Vec<String>],
    ctx: &RunContext,
) -> Result<usize, RankingError> {
    let persisted = sink.read_rows(table, columns).await?;
    persist_increment(sink, table, columns, fresh, &persisted, ctx).await
}

/// Reads the composite table restricted to one sector's rows. The shared
/// table carries every sector's columns; each row names its sector in the
/// `sector` column. Rows come back trimmed to `columns`.
pub async fn read_composite_rows(
    sink: &dyn ScoreSink,
    sector: Sector,
    columns: &[&str],
) -> Result<Vec<Vec<String>>, RankingError> {
    let mut read_cols: Vec<&str> = columns.to_vec();
    let sector_idx = ensure_column(&mut read_cols, "sector");

    let rows = sink.read_rows(tables::FINAL_TABLE, &read_cols).await?;
    let out = rows
        .into_iter()
        .filter(|row| row[sector_idx] == sector.as_str())
        .map(|mut row| {
            row.truncate(columns.len());
            row
        })
        .collect();
    Ok(out)
}

fn ensure_column<'a>(cols: &mut Vec<&'a str>, name: &'a str) -> usize {
    match cols.iter().position(|c| *c == name) {
        Some(i) => i,
        None => {
            cols.push(name);
            cols.len() - 1
        }
    }
}
