//! Worker resource initialization.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use crate::analysis::{Analyzer, Scorer};
use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::fetch::HttpFetcher;
use crate::initialization::{init_blacklist, init_client, init_scoring_policy};
use crate::queue::{connect_with_retry, JobQueue, SqliteQueue};
use crate::storage::{init_pool, SqliteResultStore};

use super::resources::WorkerResources;

/// Builds the analysis pipeline: HTTP client, deny-list and scoring strategy.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a deny-list or
/// scoring policy file cannot be loaded.
pub async fn init_analyzer(config: &Config) -> Result<Analyzer> {
    let client = init_client(config)
        .await
        .context("Failed to initialize HTTP client")?;
    let blacklist = init_blacklist(config.blacklist_file.as_deref())
        .context("Failed to load deny-list")?;
    let policy = init_scoring_policy(config.scoring_policy.as_deref())
        .context("Failed to load scoring policy")?;
    let scorer = Scorer::new(config.scoring_model, policy);

    Ok(Analyzer::new(
        Arc::new(HttpFetcher::new(client)),
        blacklist,
        scorer,
        config.fetch_timeout(),
    ))
}

/// Connects to the broker (with bounded retries) and declares the job queue.
///
/// # Errors
///
/// Returns an error once all connection attempts fail or the declaration is
/// rejected.
pub async fn init_queue(config: &Config) -> Result<SqliteQueue> {
    let queue = connect_with_retry(
        &config.queue_url,
        config.broker_connect_attempts,
        config.broker_connect_delay(),
    )
    .await
    .context("Failed to connect to the job queue")?
    .with_max_deliveries(config.max_deliveries)
    .with_lease_duration(config.lease_duration());

    queue
        .declare(&config.queue_name)
        .await
        .with_context(|| format!("Failed to declare queue '{}'", config.queue_name))?;
    Ok(queue)
}

/// Opens the result store and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub async fn init_store(config: &Config) -> Result<SqliteResultStore> {
    let pool = init_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open result store at {}", config.database_url))?;
    Ok(SqliteResultStore::new(pool))
}

/// Initializes everything a worker needs, broker first so an unreachable
/// broker fails fast.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
pub async fn init_worker_resources(config: &Config) -> Result<WorkerResources> {
    let start_time = Instant::now();
    let queue = init_queue(config).await?;
    let store = init_store(config).await?;
    let analyzer = init_analyzer(config).await?;
    info!(
        "Worker ready: queue '{}' at {}, results at {}, scoring {}",
        config.queue_name,
        config.queue_url,
        config.database_url,
        analyzer.scoring_version()
    );

    Ok(WorkerResources {
        queue: Arc::new(queue),
        store: Arc::new(store),
        analyzer: Arc::new(analyzer),
        stats: Arc::new(ProcessingStats::new()),
        queue_name: config.queue_name.clone(),
        start_time,
    })
}
