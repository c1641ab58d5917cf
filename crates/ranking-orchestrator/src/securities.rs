//! Securities pipeline: margin and leverage ratios, revenue-mix
//! diversification, and trading-income stability.

use ranking_core::{
    Panel, RankingError, RunContext, ScoreRecord, ScoreSink, Sector, StatementSource,
};
use ratio_engine::profit::{self, ProfitStageConfig};
use ratio_engine::securities::{
    debt_stage, fvtpl_variation_stage, leverage_stage, nim_stage, revenue_mix_stage,
    REVENUE_LINES,
};
use scoring_engine::composite::{
    health_score, health_tier_label, profit_score, rank_label, HealthAggregation,
};
use scoring_engine::peer::{group_median, group_ratio_of_sums};
use scoring_engine::strategies::{
    below_median_score, binary_score, diversification_score, lines_to_reach,
    loans_to_equity_score, Direction,
};
use score_store::tables;
use tracing::info;

use crate::{persist, upstream};

/// Supplementary loss-provision line item merged into the income statement.
const LOSS_PROVISION_ITEM: i64 = 700_053;

const VARIATION_WINDOW: usize = 12;
const TOP_SHARE_THRESHOLD: f64 = 0.8;

/// Everything the securities run persists, before the upstream join.
pub struct SecuritiesArtifacts {
    pub mix_rows: Vec<Vec<String>>,
    pub ratio_rows: Vec<Vec<String>>,
    pub records: Vec<ScoreRecord>,
}

/// Pure scoring assembly. `income` must carry `net_income`,
/// `interest_expenses`, `sales`, `fvtpl`, the revenue lines, and the merged
/// `provision_for_losses`; `balance` carries `equity`, `assets`, `loans`,
/// and `debt`. `fvtpl` is the trading-income statement figure the variation
/// window runs over; `income_fvtpl` is the revenue-mix line.
pub fn assemble(income: &Panel, balance: &Panel) -> SecuritiesArtifacts {
    let mut right: Vec<&str> = vec![
        "net_income",
        "interest_expenses",
        "provision_for_losses",
        "sales",
        "fvtpl",
    ];
    right.extend(REVENUE_LINES);
    let mut joined = balance.inner_join(income, &["equity", "assets", "loans", "debt"], &right);

    profit::apply(
        &mut joined,
        ProfitStageConfig {
            assets_lag_only: true,
        },
    );
    nim_stage(&mut joined);
    leverage_stage(&mut joined);
    debt_stage(&mut joined);
    revenue_mix_stage(&mut joined);
    fvtpl_variation_stage(&mut joined, VARIATION_WINDOW);

    let mix_rows = joined
        .rows()
        .iter()
        .map(|row| persist::panel_values(row, &tables::MIX_SECURITIES_COLUMNS[3..]))
        .collect();
    let ratio_rows = joined
        .rows()
        .iter()
        .map(|row| persist::panel_values(row, &tables::RATIO_SECURITIES_COLUMNS[3..]))
        .collect();

    // Sector aggregates. ROE/ROA benchmarks divide the summed quarterly net
    // income by summed average equity/assets, as this sector has always
    // been benchmarked; the company side stays TTM.
    let roe_bench = group_ratio_of_sums(&joined, "net_income", "equity_m");
    let roa_bench = group_ratio_of_sums(&joined, "net_income", "assets_m");
    let nim_bench = group_ratio_of_sums(&joined, "nim_spread", "loans");
    let dte_median = group_median(&joined, "debt_to_equity");
    let coef_median = group_median(&joined, "coef_var_12q");

    let pct_columns: Vec<String> = REVENUE_LINES.iter().map(|l| format!("{l}_pct")).collect();

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
            "score_nim_sector",
            binary_score(
                row.get("nim_securities"),
                nim_bench.get(&period).copied().flatten(),
                Direction::HigherIsBetter,
            ),
        );
        record.score_profit = profit_score(&[
            record.criterion("score_roe_sector"),
            record.criterion("score_roa_sector"),
            record.criterion("score_nim_sector"),
        ]);
        record.rank_profit = rank_label(record.score_profit);

        let shares: Vec<Option<f64>> = pct_columns.iter().map(|c| row.get(c)).collect();
        let health = [
            loans_to_equity_score(row.get("lte"), row.get("lte_8q")),
            below_median_score(
                row.get("debt_to_equity"),
                dte_median.get(&period).copied().flatten(),
            ),
            lines_to_reach(&shares, TOP_SHARE_THRESHOLD).map(diversification_score),
            below_median_score(
                row.get("coef_var_12q"),
                coef_median.get(&period).copied().flatten(),
            ),
        ];
        for (name, score) in [
            "score_lte",
            "score_dte",
            "score_diversified_sale",
            "score_coef_variation",
        ]
        .iter()
        .zip(health)
        {
            record.set_criterion(name, score);
        }
        record.score_health = health_score(&health, HealthAggregation::Sum);
        record.rank_health = health_tier_label(record.score_health);

        records.push(record);
    }

    SecuritiesArtifacts {
        mix_rows,
        ratio_rows,
        records,
    }
}

/// Full securities run: fetch, assemble, persist the three tables through
/// the diff layer.
pub async fn run(
    source: &dyn StatementSource,
    sink: &dyn ScoreSink,
    ctx: &RunContext,
) -> Result<(), RankingError> {
    info!("securities ranking run started");

    let symbols = source.sector_symbols(Sector::Securities).await?;
    let income_rows = source.income_statement(Sector::Securities).await?;
    let balance_rows = source.balance_sheet(Sector::Securities).await?;
    if income_rows.is_empty() || balance_rows.is_empty() {
        return Err(RankingError::InsufficientData(
            "securities statements are empty".to_string(),
        ));
    }

    let mut provisions = Vec::new();
    for symbol in &symbols {
        provisions.extend(source.line_items(symbol, LOSS_PROVISION_ITEM).await?);
    }

    let income = Panel::from_raw(income_rows)?.merge_line_items(&provisions, "provision_for_losses");
    let balance = Panel::from_raw(balance_rows)?;
    let artifacts = assemble(&income, &balance);

    persist::persist_table(
        sink,
        tables::MIX_SECURITIES_TABLE,
        tables::MIX_SECURITIES_COLUMNS,
        &artifacts.mix_rows,
        ctx,
    )
    .await?;
    persist::persist_table(
        sink,
        tables::RATIO_SECURITIES_TABLE,
        tables::RATIO_SECURITIES_COLUMNS,
        &artifacts.ratio_rows,
        ctx,
    )
    .await?;

    let upstream_rows = sink.upstream_scores().await?;
    let records = upstream::finalize(artifacts.records, &upstream_rows);
    let fresh: Vec<Vec<String>> = records
        .iter()
        .map(|record| persist::final_row(record, Sector::Securities, tables::FINAL_COLUMNS_SECURITIES))
        .collect();
    let persisted =
        persist::read_composite_rows(sink, Sector::Securities, tables::FINAL_COLUMNS_SECURITIES)
            .await?;
    persist::persist_increment(
        sink,
        tables::FINAL_TABLE,
        tables::FINAL_COLUMNS_SECURITIES,
        &fresh,
        &persisted,
        ctx,
    )
    .await?;

    info!("securities ranking run finished");
    Ok(())
}
