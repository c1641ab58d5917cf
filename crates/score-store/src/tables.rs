//! Sink table names and column lists.
//!
//! Column lists exclude the trailing `update_day` stamp: the diff layer
//! compares rows without it, and the stamp is appended just before insert.
//! The composite table is shared by all sectors; each sector writes its own
//! column subset and recognizes its own rows by the `sector` column.

/// Composite fundamental-score table shared by all sectors.
pub const FINAL_TABLE: &str = "stock_fundamental_score_financial";

pub const FINAL_COLUMNS_BANK: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "sector",
    "score_roe_sector",
    "score_roa_sector",
    "score_nim_sector",
    "score_profit",
    "rank_profit",
    "z_loan_provision_ratio",
    "z_deposit_to_loan",
    "z_npl_ratio_inv",
    "z_npl_coverage",
    "score_health",
    "rank_health",
    "score_eps_above_average",
    "score_eps_growth",
    "score_eps_above_sector",
    "score_eps_above_group",
    "score_growth",
    "rank_growth",
    "score_pe_5y",
    "score_pb_5y",
    "score_pe_sector",
    "score_pb_sector",
    "score_valuation",
    "rank_valuation",
    "score_final",
    "rank_final",
];

pub const FINAL_COLUMNS_INSURANCE: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "sector",
    "score_roe_sector",
    "score_roa_sector",
    "score_combined_ratio_sector",
    "score_profit",
    "rank_profit",
    "score_npw_to_equity",
    "score_net_leverage",
    "score_gross_reserves_to_equity",
    "score_npw_gpw",
    "score_health",
    "rank_health",
    "score_eps_above_average",
    "score_eps_growth",
    "score_eps_above_sector",
    "score_eps_above_group",
    "score_growth",
    "rank_growth",
    "score_pe_5y",
    "score_pb_5y",
    "score_pe_sector",
    "score_pb_sector",
    "score_valuation",
    "rank_valuation",
    "score_final",
    "rank_final",
];

pub const FINAL_COLUMNS_SECURITIES: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "sector",
    "score_roe_sector",
    "score_roa_sector",
    "score_nim_sector",
    "score_profit",
    "rank_profit",
    "score_lte",
    "score_dte",
    "score_diversified_sale",
    "score_coef_variation",
    "score_health",
    "rank_health",
    "score_eps_above_average",
    "score_eps_growth",
    "score_eps_above_sector",
    "score_eps_above_group",
    "score_growth",
    "rank_growth",
    "score_pe_5y",
    "score_pb_5y",
    "score_pe_sector",
    "score_pb_sector",
    "score_valuation",
    "rank_valuation",
    "score_final",
    "rank_final",
];

/// Every column the composite table carries, across all sectors.
pub const FINAL_COLUMNS_ALL: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "sector",
    "score_roe_sector",
    "score_roa_sector",
    "score_nim_sector",
    "score_combined_ratio_sector",
    "score_profit",
    "rank_profit",
    "z_loan_provision_ratio",
    "z_deposit_to_loan",
    "z_npl_ratio_inv",
    "z_npl_coverage",
    "score_npw_to_equity",
    "score_net_leverage",
    "score_gross_reserves_to_equity",
    "score_npw_gpw",
    "score_lte",
    "score_dte",
    "score_diversified_sale",
    "score_coef_variation",
    "score_health",
    "rank_health",
    "score_eps_above_average",
    "score_eps_growth",
    "score_eps_above_sector",
    "score_eps_above_group",
    "score_growth",
    "rank_growth",
    "score_pe_5y",
    "score_pb_5y",
    "score_pe_sector",
    "score_pb_sector",
    "score_valuation",
    "rank_valuation",
    "score_final",
    "rank_final",
];

pub const TTM_INSURANCE_TABLE: &str = "income_statement_insurance";
pub const TTM_INSURANCE_COLUMNS: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "incurred_losses_ttm",
    "expenses_ttm",
    "revenues_ttm",
];

pub const RATIO_INSURANCE_TABLE: &str = "stock_financial_ratio_insurance";
pub const RATIO_INSURANCE_COLUMNS: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "combined_ratio_ttm",
    "npw_to_equity",
    "net_leverage",
    "gross_reserves_to_equity",
    "npw_gpw",
];

pub const MIX_SECURITIES_TABLE: &str = "income_statement_securities";
pub const MIX_SECURITIES_COLUMNS: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "income_fvtpl_pct",
    "income_htm_pct",
    "income_loans_receivables_pct",
    "income_afs_pct",
    "income_derivatives_pct",
    "revenue_brokerage_pct",
    "revenue_underwriting_pct",
    "revenue_advisory_pct",
    "revenue_auction_trust_pct",
    "revenue_custody_pct",
    "other_revenues_pct",
    "fvtpl_mean_12q",
    "fvtpl_std_12q",
];

pub const RATIO_SECURITIES_TABLE: &str = "stock_financial_ratio_securities";
pub const RATIO_SECURITIES_COLUMNS: &[&str] = &[
    "symbol",
    "year",
    "quarter",
    "nim_securities",
    "lte_8q",
    "lte",
    "debt_to_equity",
    "coef_var_12q",
];

/// Upstream fundamental score table (read-only here): growth/valuation
/// pillars for every sector, plus the bank health/profit criterion scores.
pub const UPSTREAM_TABLE: &str = "stock_fundamental_score";

/// Stamp column appended to every sink table row at insert time.
pub const UPDATE_COLUMN: &str = "update_day";

/// Column list with the update stamp appended, for inserts and DDL.
pub fn with_update<'a>(columns: &[&'a str]) -> Vec<&'a str> {
    let mut out = columns.to_vec();
    out.push(UPDATE_COLUMN);
    out
}
