//! Server binary: composes the application context and hosts the API
//! plus the worker pool in one process.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_api::{create_router, ApiConfig, AppState};
use reel_assets::{MarkStore, RetentionConfig, RetentionSweeper};
use reel_queue::JobStore;
use reel_worker::{JobExecutor, WorkerConfig, WorkerContext};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Tracing: colored output for dev, JSON when requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("reel=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting reel-api");

    let api_config = ApiConfig::from_env();
    let worker_config = WorkerConfig::from_env();
    info!(
        "Config: host={}, port={}, jobs={}",
        api_config.host, api_config.port, worker_config.max_concurrent_jobs
    );

    // Application context, composed once
    let store = Arc::new(JobStore::new());
    let marks = match MarkStore::load(worker_config.marks_path()).await {
        Ok(marks) => Arc::new(marks),
        Err(e) => {
            error!("Failed to load mark store: {e}");
            std::process::exit(1);
        }
    };
    let ctx = Arc::new(WorkerContext::from_env(
        worker_config.clone(),
        Arc::clone(&store),
    ));

    // Worker pool
    let executor = Arc::new(JobExecutor::new(Arc::clone(&ctx)));
    let executor_task = Arc::clone(&executor);
    tokio::spawn(async move {
        executor_task.run().await;
    });

    // Retention: sweep on startup, then daily
    let sweeper = RetentionSweeper::new(
        RetentionConfig {
            roots: worker_config.retention_roots(),
            ..Default::default()
        },
        Arc::clone(&marks),
    );
    let sweep_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweeper.interval());
        loop {
            interval.tick().await;
            let active: HashSet<String> = sweep_store.active_ids().await.into_iter().collect();
            if let Err(e) = sweeper.sweep(&active).await {
                warn!("Retention sweep failed: {e}");
            }
        }
    });

    // Router and listener
    let state = AppState::new(api_config.clone(), store, marks);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", api_config.host, api_config.port)
        .parse()
        .expect("Invalid bind address");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            error!("Port {} already in use", api_config.port);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!("Listening on {addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(executor))
        .await
    {
        error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn shutdown_signal(executor: Arc<JobExecutor>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
    executor.shutdown_handle().send(true).ok();
}
