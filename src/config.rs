use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::engine::{MIN_PREDICTIONS_FOR_RANKING, SETTLEMENT_CHUNK_SIZE};

/// Configuration for the CrowdOracle engine server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Scoring and settlement configuration
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, uses the in-memory store)
    pub postgres_enabled: bool,
    /// Connection pool size
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Enable per-request span logging
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Settled predictions required before a user is ranked
    pub min_predictions_for_ranking: i64,
    /// Votes scored per settlement transaction
    pub settlement_chunk_size: i64,
    /// Rows returned by the leaderboard endpoint
    pub leaderboard_limit: i64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8090,
            },
            database: DatabaseConfig {
                postgres_url: "postgresql://localhost:5432/crowd_oracle".to_string(),
                postgres_enabled: false,
                max_connections: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: false,
            },
            scoring: ScoringConfig {
                min_predictions_for_ranking: MIN_PREDICTIONS_FOR_RANKING,
                settlement_chunk_size: SETTLEMENT_CHUNK_SIZE,
                leaderboard_limit: 100,
            },
        }
    }
}

impl OracleConfig {
    /// Load configuration from environment variables and validate it.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("CROWD_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = env::var("CROWD_PORT") {
            config.server.port = port.parse().context("Invalid CROWD_PORT value")?;
        }

        if let Ok(url) = env::var("CROWD_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Ok(enabled) = env::var("CROWD_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid CROWD_POSTGRES_ENABLED value")?;
        }

        if let Ok(max) = env::var("CROWD_DB_MAX_CONNECTIONS") {
            config.database.max_connections = max
                .parse()
                .context("Invalid CROWD_DB_MAX_CONNECTIONS value")?;
        }

        if let Ok(level) = env::var("CROWD_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(log_requests) = env::var("CROWD_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid CROWD_LOG_REQUESTS value")?;
        }

        if let Ok(min) = env::var("CROWD_MIN_PREDICTIONS_FOR_RANKING") {
            config.scoring.min_predictions_for_ranking = min
                .parse()
                .context("Invalid CROWD_MIN_PREDICTIONS_FOR_RANKING value")?;
        }

        if let Ok(chunk) = env::var("CROWD_SETTLEMENT_CHUNK_SIZE") {
            config.scoring.settlement_chunk_size = chunk
                .parse()
                .context("Invalid CROWD_SETTLEMENT_CHUNK_SIZE value")?;
        }

        if let Ok(limit) = env::var("CROWD_LEADERBOARD_LIMIT") {
            config.scoring.leaderboard_limit = limit
                .parse()
                .context("Invalid CROWD_LEADERBOARD_LIMIT value")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for consistency
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.database.postgres_enabled && self.database.postgres_url.is_empty() {
            return Err(anyhow::anyhow!(
                "PostgreSQL is enabled but no connection string is configured"
            ));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("Connection pool size must be non-zero"));
        }

        if self.scoring.min_predictions_for_ranking < 1 {
            return Err(anyhow::anyhow!(
                "Minimum predictions for ranking must be at least 1"
            ));
        }

        if self.scoring.settlement_chunk_size < 1 {
            return Err(anyhow::anyhow!("Settlement chunk size must be at least 1"));
        }

        if self.scoring.leaderboard_limit < 1 {
            return Err(anyhow::anyhow!("Leaderboard limit must be at least 1"));
        }

        Ok(())
    }
}
