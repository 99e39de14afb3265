//! Startup wiring for the scheduler and admin API.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cronsync_api::{ApiServer, AppState, ServerConfig};
use cronsync_config::{
    Config, ConfigLoader, ConfigValidator, LoggingConfig, StoreBackend, StoreConfig,
};
use cronsync_core::{GroupJobFactory, JobStateSynchronizer, MemoryJobStore, PendingRetryRecorder};
use cronsync_engine::{CronEngine, EngineConfig};
use cronsync_expr::{DateExpressionEvaluator, ProxyRewrite};
use cronsync_job_api_trigger::{ApiTriggerJob, HttpTimeouts};
use cronsync_protocols::{JobGroup, JobStore};
use cronsync_store_sqlite::SqliteJobStore;

/// Initialize tracing with console and daily-rotated file output.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = ConfigLoader::expand_path(&logging.log_dir());
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&logging.file_prefix)
        .filename_suffix("log")
        .max_log_files(logging.max_files)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the background writer.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn JobStore>> {
    match config.backend_kind()? {
        StoreBackend::Memory => {
            warn!("Using the in-memory job store; jobs are lost on restart");
            Ok(Arc::new(MemoryJobStore::new()))
        }
        StoreBackend::Sqlite => {
            let path = ConfigLoader::expand_path(&config.database_path());
            info!("Opening SQLite job store at {}", path.display());
            Ok(Arc::new(SqliteJobStore::open(&path).await?))
        }
    }
}

fn build_evaluator(config: &Config) -> anyhow::Result<DateExpressionEvaluator> {
    let rewrite = match config.rewrite.proxy_url()? {
        Some(proxy) => {
            info!("Proxy rewrite enabled via {}", proxy);
            ProxyRewrite::enabled(proxy.as_str())
        }
        None => ProxyRewrite::disabled(),
    };
    Ok(DateExpressionEvaluator::new()
        .with_utc_offset(config.expression.offset()?)
        .with_rewrite(rewrite))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the scheduler and admin API until Ctrl-C.
pub(crate) async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Starting cronsync v{}", env!("CARGO_PKG_VERSION"));

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!("Config {}: {}", err.path, err.message);
        }
        anyhow::bail!("invalid configuration ({} error(s))", validation.errors.len());
    }

    let store = open_store(&config.store).await?;
    let evaluator = Arc::new(build_evaluator(&config)?);

    let timeouts = HttpTimeouts {
        connect: config.http_client.connect_timeout(),
        read: config.http_client.read_timeout(),
    };
    let api_trigger = ApiTriggerJob::new(store.clone(), evaluator, timeouts)
        .context("building HTTP client")?;
    let factory = GroupJobFactory::new().with_body(JobGroup::ApiTrigger.name(), Arc::new(api_trigger));
    info!("Job groups with a bound body: {:?}", factory.groups());

    let engine = CronEngine::new(
        EngineConfig::new(
            config.scheduler.max_concurrent_jobs,
            config.scheduler.misfire_threshold_secs,
        ),
        Arc::new(factory),
    );
    engine.add_listener(Arc::new(PendingRetryRecorder::new(store.clone())));
    engine.start()?;

    let synchronizer = Arc::new(JobStateSynchronizer::new(
        Arc::new(engine.clone()),
        store.clone(),
    ));

    for group in &config.scheduler.startup_groups {
        match synchronizer.dispatch_group(group, &[]).await {
            Ok(jobs) => info!("Startup dispatch of '{}': {} job(s)", group, jobs.len()),
            Err(e) => error!("Startup dispatch of '{}' failed: {}", group, e),
        }
    }

    let state = AppState::new(synchronizer).with_display_offset(config.expression.offset()?);
    let server = ApiServer::new(
        ServerConfig::new(config.server.host.clone(), config.server.port),
        Arc::new(state),
    );

    let served = server.run_until(shutdown_signal()).await;

    info!("Shutting down scheduler engine");
    engine.shutdown().await;
    served.context("admin API server failed")?;

    info!("cronsync stopped");
    Ok(())
}
