//! Insurance pipeline: TTM combined ratio, peer-relative profitability, and
//! quantile-bucketed balance-sheet health.

use ranking_core::{
    Panel, RankingError, RunContext, ScoreRecord, ScoreSink, Sector, StatementSource,
};
use ratio_engine::insurance::{combined_ratio_stage, health_ratio_stage};
use ratio_engine::profit::{self, ProfitStageConfig};
use scoring_engine::composite::{
    health_score, health_tier_label, profit_score, rank_label, HealthAggregation,
};
use scoring_engine::peer::{group_median, group_quantile_cuts, group_ratio_of_sums};
use scoring_engine::strategies::{binary_score, quantile_bucket_score, Direction};
use score_store::tables;
use tracing::info;

use crate::{persist, upstream};

/// Supplementary line items merged into the statement panels.
const CEDED_RESERVES_ITEM: i64 = 411_920;
const NET_REVENUE_ITEM: i64 = 21_001;

const TTM_WINDOW: usize = 4;

/// Health ratio column and the criterion score column it feeds.
const HEALTH_CRITERIA: [(&str, &str); 4] = [
    ("npw_to_equity", "score_npw_to_equity"),
    ("net_leverage", "score_net_leverage"),
    ("gross_reserves_to_equity", "score_gross_reserves_to_equity"),
    ("npw_gpw", "score_npw_gpw"),
];

/// Everything the insurance run persists, before the upstream join.
pub struct InsuranceArtifacts {
    pub ttm_rows: Vec<Vec<String>>,
    pub ratio_rows: Vec<Vec<String>>,
    pub records: Vec<ScoreRecord>,
}

/// Pure scoring assembly. `income` must carry `incurred_losses`, `expenses`,
/// `net_income`, and the merged `revenues`; `balance` the equity/assets and
/// premium/reserve columns plus the merged `ceded_reserves`.
pub fn assemble(mut income: Panel, balance: &Panel) -> InsuranceArtifacts {
    combined_ratio_stage(&mut income, TTM_WINDOW);
    let ttm_rows = income
        .rows()
        .iter()
        .map(|row| persist::panel_values(row, &tables::TTM_INSURANCE_COLUMNS[3..]))
        .collect();

    let mut joined = balance.inner_join(
        &income,
        &[
            "equity",
            "assets",
            "net_premium_written",
            "gross_premium_written",
            "provisions",
            "ceded_reserves",
        ],
        &["net_income", "combined_ratio_ttm"],
    );
    profit::apply(&mut joined, ProfitStageConfig::default());
    health_ratio_stage(&mut joined);

    let ratio_rows = joined
        .rows()
        .iter()
        .map(|row| persist::panel_values(row, &tables::RATIO_INSURANCE_COLUMNS[3..]))
        .collect();

    // Sector benchmarks: aggregate ROE/ROA as ratio of sums, combined ratio
    // against the median of the individual ratios.
    let roe_bench = group_ratio_of_sums(&joined, "net_income_ttm", "equity_m");
    let roa_bench = group_ratio_of_sums(&joined, "net_income_ttm", "assets_m");
    let combined_median = group_median(&joined, "combined_ratio_ttm");
    let health_cuts: Vec<_> = HEALTH_CRITERIA
        .iter()
        .map(|(field, _)| group_quantile_cuts(&joined, field))
        .collect();

    let mut records = Vec::with_capacity(joined.len());
    for row in joined.rows() {
        let period = (row.year, row.quarter);
        let mut record = ScoreRecord::new(row.symbol.clone(), row.year, row.quarter);

        record.set_criterion(
            "score_roe_sector",
            binary_score(
                row.get("roe_ttm"),
                roe_bench.get(&period).copied().flatten(),
                Direction::HigherIsBetter,
            ),
        );
        record.set_criterion(
            "score_roa_sector",
            binary_score(
                row.get("roa_ttm"),
                roa_bench.get(&period).copied().flatten(),
                Direction::HigherIsBetter,
            ),
        );
        record.set_criterion(
            "score_combined_ratio_sector",
            binary_score(
                row.get("combined_ratio_ttm"),
                combined_median.get(&period).copied().flatten(),
                Direction::LowerIsBetter,
            ),
        );
        record.score_profit = profit_score(&[
            record.criterion("score_roe_sector"),
            record.criterion("score_roa_sector"),
            record.criterion("score_combined_ratio_sector"),
        ]);
        record.rank_profit = rank_label(record.score_profit);

        let mut health = [None; 4];
        for (i, (field, score_name)) in HEALTH_CRITERIA.iter().enumerate() {
            let cuts = health_cuts[i].get(&period).copied().flatten();
            health[i] = quantile_bucket_score(row.get(field), cuts);
            record.set_criterion(score_name, health[i]);
        }
        record.score_health = health_score(&health, HealthAggregation::RoundedMean);
        record.rank_health = health_tier_label(record.score_health);

        records.push(record);
    }

    InsuranceArtifacts {
        ttm_rows,
        ratio_rows,
        records,
    }
}

/// Full insurance run: fetch, assemble, persist the three tables through the
/// diff layer.
pub async fn run(
    source: &dyn StatementSource,
    sink: &dyn ScoreSink,
    ctx: &RunContext,
) -> Result<(), RankingError> {
    info!("insurance ranking run started");

    let symbols = source.sector_symbols(Sector::Insurance).await?;
    let income_rows = source.income_statement(Sector::Insurance).await?;
    let balance_rows = source.balance_sheet(Sector::Insurance).await?;
    if income_rows.is_empty() || balance_rows.is_empty() {
        return Err(RankingError::InsufficientData(
            "insurance statements are empty".to_string(),
        ));
    }

    let mut revenues = Vec::new();
    let mut ceded = Vec::new();
    for symbol in &symbols {
        revenues.extend(source.line_items(symbol, NET_REVENUE_ITEM).await?);
        ceded.extend(source.line_items(symbol, CEDED_RESERVES_ITEM).await?);
    }

    let income = Panel::from_raw(income_rows)?.merge_line_items(&revenues, "revenues");
    let balance = Panel::from_raw(balance_rows)?.merge_line_items(&ceded, "ceded_reserves");
    let artifacts = assemble(income, &balance);

    persist::persist_table(
        sink,
        tables::TTM_INSURANCE_TABLE,
        tables::TTM_INSURANCE_COLUMNS,
        &artifacts.ttm_rows,
        ctx,
    )
    .await?;
    persist::persist_table(
        sink,
        tables::RATIO_INSURANCE_TABLE,
        tables::RATIO_INSURANCE_COLUMNS,
        &artifacts.ratio_rows,
        ctx,
    )
    .await?;

    let upstream_rows = sink.upstream_scores().await?;
    let records = upstream::finalize(artifacts.records, &upstream_rows);
    let fresh: Vec<Vec<String>> = records
        .iter()
        .map(|record| persist::final_row(record, Sector::Insurance, tables::FINAL_COLUMNS_INSURANCE))
        .collect();
    let persisted =
        persist::read_composite_rows(sink, Sector::Insurance, tables::FINAL_COLUMNS_INSURANCE)
            .await?;
    persist::persist_increment(
        sink,
        tables::FINAL_TABLE,
        tables::FINAL_COLUMNS_INSURANCE,
        &fresh,
        &persisted,
        ctx,
    )
    .await?;

    info!("insurance ranking run finished");
    Ok(())
}
