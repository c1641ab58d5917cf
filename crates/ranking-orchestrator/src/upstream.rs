//! Joining sector score records with the upstream growth/valuation pillars
//! and closing out the composite score.

use std::collections::HashMap;

use ranking_core::{ScoreRecord, UpstreamScoreRow};
use scoring_engine::composite::{final_score, rank_label};

/// Inner-joins records with upstream rows on (symbol, year, quarter), copies
/// the growth and valuation pillars across, and computes the final score and
/// rank. Records without an upstream counterpart are dropped.
pub fn finalize(records: Vec<ScoreRecord>, upstream: &[UpstreamScoreRow]) -> Vec<ScoreRecord> {
    let mut index: HashMap<(String, i32, u8), &UpstreamScoreRow> = HashMap::new();
    for row in upstream {
        index
            .entry((row.symbol.clone(), row.year, row.quarter))
            .or_insert(row);
    }

    let mut out = Vec::with_capacity(records.len());
    for mut record in records {
        let key = (record.symbol.clone(), record.year, record.quarter);
        let Some(up) = index.get(&key) else {
            continue;
        };

        record.set_criterion("score_eps_above_average", up.score_eps_above_average);
        record.set_criterion("score_eps_growth", up.score_eps_growth);
        record.set_criterion("score_eps_above_sector", up.score_eps_above_sector);
        record.set_criterion("score_eps_above_group", up.score_eps_above_group);
        record.set_criterion("score_pe_5y", up.score_pe_5y);
        record.set_criterion("score_pb_5y", up.score_pb_5y);
        record.set_criterion("score_pe_sector", up.score_pe_sector);
        record.set_criterion("score_pb_sector", up.score_pb_sector);
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
        out.push(record);
    }
    out
}
