use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use jobflow::classifier::OpenRouterClassifier;
use jobflow::config::Config;
use jobflow::db::create_pool;
use jobflow::evaluate::EvaluationRunner;
use jobflow::store::PgJobStore;

/// Pause between classifications, to stay under the model endpoint's rate
/// limits.
const CLASSIFY_PACING: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    jobflow::telemetry::init(&config.rust_log);

    info!(
        "Starting jobflow evaluation runner v{} (model: {})",
        env!("CARGO_PKG_VERSION"),
        config.llm_model
    );

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let store = Arc::new(PgJobStore::new(pool));
    let classifier = Arc::new(OpenRouterClassifier::new(
        config.openrouter_api_key.clone(),
        config.llm_model.clone(),
    ));
    let runner = EvaluationRunner::new(store, classifier, config.profile(), CLASSIFY_PACING);

    let period = Duration::from_secs(config.evaluator_interval_secs);
    info!("Evaluation scheduled every {}s", period.as_secs());

    // First tick fires immediately. Delay on missed ticks means an
    // overrunning run defers the next trigger instead of stacking runs.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match runner.run().await {
            Ok(report) => info!(
                "Evaluation run finished: {} relevant, {} rejected, {} failed",
                report.relevant, report.rejected, report.failed
            ),
            Err(e) => error!("Evaluation run aborted: {e}"),
        }
    }
}
