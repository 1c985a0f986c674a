use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use jobflow::config::Config;
use jobflow::db::create_pool;
use jobflow::ingest::IngestionRunner;
use jobflow::source::ScraperGatewaySource;
use jobflow::store::PgJobStore;

/// Pause between persisted insertions, to stay under the source's rate
/// limits.
const INSERT_PACING: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    jobflow::telemetry::init(&config.rust_log);

    info!(
        "Starting jobflow ingestion runner v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let store = Arc::new(PgJobStore::new(pool));
    let source = ScraperGatewaySource::new(
        config.scraper_gateway_url.clone(),
        config.linkedin_username.clone(),
        config.linkedin_password.clone(),
        config.headless,
    );
    let mut runner = IngestionRunner::new(
        store,
        source,
        config.search_keywords.clone(),
        INSERT_PACING,
    );

    let period = Duration::from_secs(config.scraper_interval_secs);
    info!("Ingestion scheduled every {}s", period.as_secs());

    // First tick fires immediately. Delay on missed ticks means an
    // overrunning run defers the next trigger instead of stacking runs.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match runner.run().await {
            Ok(report) => info!(
                "Ingestion run finished: {} inserted, {} duplicates",
                report.inserted, report.duplicates
            ),
            Err(e) => error!("Ingestion run aborted: {e}"),
        }
    }
}
