use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geoprofile_core::{
    create_executor, load_config, validate_config, CliProcessor, Processor, ResultPublisher,
    SqliteTicketStore, TicketStore,
};

use geoprofile_server::api::create_router;
use geoprofile_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("GEOPROFILE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Output directory: {:?}", config.storage.output_dir);

    // Compute config hash for startup logging
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Ensure the storage layout exists
    std::fs::create_dir_all(&config.storage.output_dir)
        .context("Failed to create output directory")?;
    std::fs::create_dir_all(&config.storage.temp_dir)
        .context("Failed to create temp directory")?;

    // Create SQLite ticket store
    let ticket_store: Arc<dyn TicketStore> = Arc::new(
        SqliteTicketStore::new(&config.database.path).context("Failed to create ticket store")?,
    );
    info!("Ticket store initialized");

    // Create the processor delegating to the external profiler tool
    let processor: Arc<dyn Processor> = Arc::new(CliProcessor::new(config.processor.clone()));
    match processor.validate().await {
        Ok(()) => info!("Profiler tool available: {:?}", config.processor.command),
        Err(e) => error!(
            "Profiler tool check failed ({}); deferred jobs will fail until it is available",
            e
        ),
    }

    // Create the result publisher and the background worker pool
    let publisher = Arc::new(ResultPublisher::new(
        Arc::clone(&ticket_store),
        config.storage.output_dir.clone(),
    ));
    let (executor, runner) = create_executor(&config.executor, Arc::clone(&processor), publisher);
    let runner_handle = tokio::spawn(runner.run());
    info!(
        "Job executor started ({} workers, queue size {})",
        config.executor.workers, config.executor.queue_size
    );

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        ticket_store,
        processor,
        executor,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // The runner drains and exits once every executor handle is gone; the
    // AppState holding the last one was dropped with the router above.
    let _ = runner_handle.await;
    info!("Job runner stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
