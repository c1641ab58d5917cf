use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::RankingError;

/// Financial sector a ranking run operates on. Each sector runs its own
/// pipeline over its own statement tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sector {
    Bank,
    Insurance,
    Securities,
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Bank => "bank",
            Sector::Insurance => "insurance",
            Sector::Securities => "securities",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bank" | "banks" => Ok(Sector::Bank),
            "insurance" => Ok(Sector::Insurance),
            "securities" => Ok(Sector::Securities),
            other => Err(RankingError::InvalidData(format!(
                "unknown sector: {other}"
            ))),
        }
    }
}

/// Explicit per-run parameters. The engine never reads the current date from
/// ambient state; the as-of date stamps every inserted row.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub sector: Sector,
    pub as_of: NaiveDate,
}

impl RunContext {
    pub fn new(sector: Sector, as_of: NaiveDate) -> Self {
        Self { sector, as_of }
    }

    /// Run-date stamp written to the `update_day` column (YYYYMMDD).
    pub fn update_stamp(&self) -> String {
        self.as_of.format("%Y%m%d").to_string()
    }
}

/// Composite letter rank mapped from a 0-4 score with fixed cut-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    A,
    B,
    C,
    D,
}

impl Rank {
    /// Ascending cut-points, first match wins: < 1 → D, < 2 → C, < 3 → B,
    /// else A.
    pub fn from_score(score: f64) -> Self {
        if score < 1.0 {
            Rank::D
        } else if score < 2.0 {
            Rank::C
        } else if score < 3.0 {
            Rank::B
        } else {
            Rank::A
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
        }
    }
}

/// Health-pillar tier labels, mapped with descending cut-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthTier {
    SafePlus,
    Safe,
    Warning,
    Danger,
}

impl HealthTier {
    /// > 3 → Safe +, > 2 → Safe, > 1 → Warning, else Danger.
    pub fn from_score(score: f64) -> Self {
        if score > 3.0 {
            HealthTier::SafePlus
        } else if score > 2.0 {
            HealthTier::Safe
        } else if score > 1.0 {
            HealthTier::Warning
        } else {
            HealthTier::Danger
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthTier::SafePlus => "Safe +",
            HealthTier::Safe => "Safe",
            HealthTier::Warning => "Warning",
            HealthTier::Danger => "Danger",
        }
    }
}

/// One supplementary statement line item for a company quarter, fetched from
/// the line-item source by item code (e.g. ceded reserves, net revenues).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemRow {
    pub symbol: String,
    pub year: i32,
    pub quarter: u8,
    pub value: Option<f64>,
}

/// Previously computed growth/valuation (and, for banks, health) scores read
/// from the upstream fundamental score table. Consumed read-only and merged
/// by (symbol, year, quarter) with inner-join semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamScoreRow {
    pub symbol: String,
    pub year: i32,
    pub quarter: u8,
    pub score_eps_above_average: Option<f64>,
    pub score_eps_growth: Option<f64>,
    pub score_eps_above_sector: Option<f64>,
    pub score_eps_above_group: Option<f64>,
    pub score_growth: Option<f64>,
    pub rank_growth: String,
    pub score_pe_5y: Option<f64>,
    pub score_pb_5y: Option<f64>,
    pub score_pe_sector: Option<f64>,
    pub score_pb_sector: Option<f64>,
    pub score_valuation: Option<f64>,
    pub rank_valuation: String,
    // Bank pipelines pass these through unchanged; empty for other sectors.
    pub score_roe_sector: Option<f64>,
    pub score_roa_sector: Option<f64>,
    pub score_nim_sector: Option<f64>,
    pub z_loan_provision_ratio: Option<f64>,
    pub z_deposit_to_loan: Option<f64>,
    pub z_npl_ratio_inv: Option<f64>,
    pub z_npl_coverage: Option<f64>,
    pub score_health: Option<f64>,
    pub rank_health: String,
}

/// Fully scored output for one company quarter: per-criterion scores, the
/// four pillar scores with their rank labels, and the composite result.
///
/// An undefined ratio anywhere upstream leaves the affected scores `None`;
/// the rank is then also `None` and is surfaced as such, never defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub symbol: String,
    pub year: i32,
    pub quarter: u8,
    /// Criterion name → score (0-4 range depending on the strategy).
    pub criterion_scores: BTreeMap<String, Option<f64>>,
    pub score_profit: Option<f64>,
    pub rank_profit: Option<String>,
    pub score_health: Option<f64>,
    pub rank_health: Option<String>,
    pub score_growth: Option<f64>,
    pub rank_growth: String,
    pub score_valuation: Option<f64>,
    pub rank_valuation: String,
    pub score_final: Option<f64>,
    pub rank_final: Option<String>,
}

impl ScoreRecord {
    pub fn new(symbol: impl Into<String>, year: i32, quarter: u8) -> Self {
        Self {
            symbol: symbol.into(),
            year,
            quarter,
            criterion_scores: BTreeMap::new(),
            score_profit: None,
            rank_profit: None,
            score_health: None,
            rank_health: None,
            score_growth: None,
            rank_growth: String::new(),
            score_valuation: None,
            rank_valuation: String::new(),
            score_final: None,
            rank_final: None,
        }
    }

    pub fn criterion(&self, name: &str) -> Option<f64> {
        self.criterion_scores.get(name).copied().flatten()
    }

    pub fn set_criterion(&mut self, name: &str, score: Option<f64>) {
        self.criterion_scores.insert(name.to_string(), score);
    }
}
