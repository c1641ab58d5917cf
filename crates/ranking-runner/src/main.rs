//! Sector ranking runner: computes financial-health and profitability
//! rankings per sector and appends new score rows to the database.

mod config;

use anyhow::bail;
use ranking_core::{RunContext, Sector};
use ranking_orchestrator::{bank, insurance, securities};
use score_store::SqliteStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(as_of = %config.as_of, sectors = config.sectors.len(), "starting ranking run");

    let store = SqliteStore::connect(&config.database_url).await?;
    store.init_schema().await?;

    // Sectors run independently; one failure does not stop the others.
    let mut failures = 0usize;
    for sector in &config.sectors {
        let ctx = RunContext::new(*sector, config.as_of);
        let result = match sector {
            Sector::Bank => bank::run(&store, &store, &ctx).await,
            Sector::Insurance => insurance::run(&store, &store, &ctx).await,
            Sector::Securities => securities::run(&store, &store, &ctx).await,
        };
        if let Err(error) = result {
            failures += 1;
            error!(sector = %sector, %error, "sector run failed");
        }
    }

    if failures > 0 {
        bail!("{failures} sector run(s) failed");
    }
    info!("ranking run finished");
    Ok(())
}
