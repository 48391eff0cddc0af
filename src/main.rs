use anyhow::Result;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use crowd_oracle::{
    router, ApiState, MemoryStore, OracleConfig, PostgresStore, Store,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first - this validates all settings
    let config = OracleConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        eprintln!("Please check environment variables.");
        e
    })?;

    init_logging(&config)?;

    info!("Starting CrowdOracle engine server");
    info!(
        "Scoring settings: ranking floor = {} predictions, settlement chunk = {}",
        config.scoring.min_predictions_for_ranking, config.scoring.settlement_chunk_size
    );

    let store = build_store(&config).await?;
    let state = ApiState::new(store, &config.scoring);

    let app = Router::new()
        .merge(router(state))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("CrowdOracle server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick the storage backend from configuration.
async fn build_store(config: &OracleConfig) -> Result<Arc<dyn Store>> {
    if config.database.postgres_enabled {
        let store = PostgresStore::connect(
            &config.database.postgres_url,
            config.database.max_connections,
        )
        .await?;
        store.init_schema().await?;
        Ok(Arc::new(store))
    } else {
        warn!("PostgreSQL disabled - using in-memory store; data will not survive a restart");
        Ok(Arc::new(MemoryStore::new()))
    }
}

fn init_logging(config: &OracleConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
