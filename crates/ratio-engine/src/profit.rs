//! Shared profitability stage: TTM return on equity and return on assets
//! over a joined balance-sheet / income-statement panel.
//!
//! Expects the columns `equity`, `assets`, and `net_income`; adds `equity_m`,
//! `assets_m`, `net_income_ttm`, `roe_ttm`, and `roa_ttm`.

use ranking_core::Panel;

use crate::rolling::{mean_available, ratio, rolling_sum, shift};

/// Per-sector knobs for the profitability stage.
#[derive(Debug, Clone, Copy)]
pub struct ProfitStageConfig {
    /// Average assets as the year-ago value alone instead of the mean of
    /// current and year-ago. The securities pipeline has always behaved this
    /// way, so its ROA is undefined for a company's first four quarters;
    /// kept as observed rather than silently corrected.
    pub assets_lag_only: bool,
}

impl Default for ProfitStageConfig {
    fn default() -> Self {
        Self {
            assets_lag_only: false,
        }
    }
}

/// Adds flow-over-average-stock profitability ratios to `panel`.
pub fn apply(panel: &mut Panel, config: ProfitStageConfig) {
    shift(panel, "equity", "equity_lag4", 4);
    shift(panel, "assets", "assets_lag4", 4);

    mean_available(panel, "equity", "equity_lag4", "equity_m");
    if config.assets_lag_only {
        mean_available(panel, "assets_lag4", "assets_lag4", "assets_m");
    } else {
        mean_available(panel, "assets", "assets_lag4", "assets_m");
    }

    rolling_sum(panel, "net_income", "net_income_ttm", 4);

    for row in panel.rows_mut() {
        let roe = ratio(row.get("net_income_ttm"), row.get("equity_m"));
        let roa = ratio(row.get("net_income_ttm"), row.get("assets_m"));
        row.set("roe_ttm", roe);
        row.set("roa_ttm", roa);
    }
}
