//! Bank pipeline: the per-criterion scores already exist upstream, so this
//! run recomputes the profit pillar and the composite from them and appends
//! the result to the shared table.

use std::collections::HashSet;

use ranking_core::{
    RankingError, RunContext, ScoreRecord, ScoreSink, Sector, StatementSource, UpstreamScoreRow,
};
use scoring_engine::composite::{final_score, profit_score, rank_label};
use score_store::tables;
use tracing::info;

use crate::persist;

/// Rebuilds one scored record per upstream bank row. Health, growth, and
/// valuation pass through; the profit pillar and the final score are
/// recomputed from the criterion scores.
pub fn assemble(upstream: &[UpstreamScoreRow], symbols: &HashSet<String>) -> Vec<ScoreRecord> {
    let mut records = Vec::new();
    for up in upstream.iter().filter(|u| symbols.contains(&u.symbol)) {
        let mut record = ScoreRecord::new(up.symbol.clone(), up.year, up.quarter);

        record.set_criterion("score_roe_sector", up.score_roe_sector);
        record.set_criterion("score_roa_sector", up.score_roa_sector);
        record.set_criterion("score_nim_sector", up.score_nim_sector);
        record.set_criterion("z_loan_provision_ratio", up.z_loan_provision_ratio);
        record.set_criterion("z_deposit_to_loan", up.z_deposit_to_loan);
        record.set_criterion("z_npl_ratio_inv", up.z_npl_ratio_inv);
        record.set_criterion("z_npl_coverage", up.z_npl_coverage);
        record.set_criterion("score_eps_above_average", up.score_eps_above_average);
        record.set_criterion("score_eps_growth", up.score_eps_growth);
        record.set_criterion("score_eps_above_sector", up.score_eps_above_sector);
        record.set_criterion("score_eps_above_group", up.score_eps_above_group);
        record.set_criterion("score_pe_5y", up.score_pe_5y);
        record.set_criterion("score_pb_5y", up.score_pb_5y);
        record.set_criterion("score_pe_sector", up.score_pe_sector);
        record.set_criterion("score_pb_sector", up.score_pb_sector);

        record.score_profit = profit_score(&[
            up.score_roe_sector,
            up.score_roa_sector,
            up.score_nim_sector,
        ]);
        record.rank_profit = rank_label(record.score_profit);

        record.score_health = up.score_health;
        record.rank_health = (!up.rank_health.is_empty()).then(|| up.rank_health.clone());
        record.score_growth = up.score_growth;
        record.rank_growth = up.rank_growth.clone();
        record.score_valuation = up.score_valuation;
        record.rank_valuation = up.rank_valuation.clone();

        record.score_final = final_score(
            record.score_profit,
            record.score_health,
            record.score_growth,
            record.score_valuation,
        );
        record.rank_final = rank_label(record.score_final);

        records.push(record);
    }
    records
}

/// Full bank run: upstream scores in, composite rows out.
pub async fn run(
    source: &dyn StatementSource,
    sink: &dyn ScoreSink,
    ctx: &RunContext,
) -> Result<(), RankingError> {
    info!("bank ranking run started");

    let symbols: HashSet<String> = source
        .sector_symbols(Sector::Bank)
        .await?
        .into_iter()
        .collect();
    let upstream = sink.upstream_scores().await?;
    if upstream.is_empty() {
        return Err(RankingError::InsufficientData(
            "no upstream fundamental scores".to_string(),
        ));
    }
    let records = assemble(&upstream, &symbols);

    let fresh: Vec<Vec<String>> = records
        .iter()
        .map(|record| persist::final_row(record, Sector::Bank, tables::FINAL_COLUMNS_BANK))
        .collect();
    let persisted = persist::read_composite_rows(sink, Sector::Bank, tables::FINAL_COLUMNS_BANK)
        .await?;
    persist::persist_increment(
        sink,
        tables::FINAL_TABLE,
        tables::FINAL_COLUMNS_BANK,
        &fresh,
        &persisted,
        ctx,
    )
    .await?;

    info!("bank ranking run finished");
    Ok(())
}
