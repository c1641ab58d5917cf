use anyhow::Context;
use chrono::NaiveDate;
use ranking_core::Sector;

/// Runner configuration from the environment (`.env` supported).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Sectors to rank, in order. `RANKING_SECTORS` as a comma-separated
    /// list; all three by default.
    pub sectors: Vec<Sector>,
    /// As-of date stamped on inserted rows. `RANKING_AS_OF` (YYYY-MM-DD),
    /// or today when unset.
    pub as_of: NaiveDate,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let sectors = std::env::var("RANKING_SECTORS")
            .unwrap_or_else(|_| "bank,insurance,securities".to_string());
        let sectors = parse_sectors(&sectors)?;

        let as_of = match std::env::var("RANKING_AS_OF") {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid RANKING_AS_OF date: {raw}"))?,
            Err(_) => chrono::Local::now().date_naive(),
        };

        Ok(Self {
            database_url,
            sectors,
            as_of,
        })
    }
}

fn parse_sectors(raw: &str) -> anyhow::Result<Vec<Sector>> {
    let sectors = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Sector>())
        .collect::<Result<Vec<_>, _>>()?;
    anyhow::ensure!(!sectors.is_empty(), "RANKING_SECTORS selects no sectors");
    Ok(sectors)
}
