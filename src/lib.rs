//! CrowdOracle Engine
//!
//! Trust-weighted aggregation and settlement engine for Yes/No prediction
//! events. Users vote with a weight derived from their historical accuracy;
//! settling an event scores every vote and propagates trust, streak, XP,
//! badge, and leaderboard consequences.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs        - Crate root with re-exports
//! ├── main.rs       - Server entrypoint
//! ├── config.rs     - Configuration management
//! ├── model.rs      - Domain rows and enums
//! ├── error.rs      - Engine and storage error taxonomy
//! ├── trust/        - Pure scoring functions
//! │   ├── tier.rs      - Trust tiers and weight multipliers
//! │   ├── weight.rs    - Vote weight at cast time
//! │   └── score.rs     - Settlement reward/penalty deltas
//! ├── engine/       - Operations
//! │   ├── ledger.rs    - Vote casting
//! │   ├── settlement.rs - Closed -> settled saga
//! │   ├── badges.rs    - Badge catalog & evaluation
//! │   ├── ranking.rs   - Leaderboard recompute
//! │   └── events.rs    - Admin event lifecycle
//! ├── database/     - Persistence
//! │   ├── postgres.rs  - sqlx/PostgreSQL store
//! │   └── memory.rs    - In-memory fallback & test store
//! └── api/          - HTTP API endpoints
//!     ├── votes.rs     - Vote casting/lookup
//!     ├── events.rs    - Event authoring & settlement
//!     └── leaderboard.rs - Read models
//! ```

pub mod api;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod model;
pub mod trust;

// Re-export main types for convenience
pub use api::{router, ApiState};
pub use config::{DatabaseConfig, LoggingConfig, OracleConfig, ScoringConfig, ServerConfig};
pub use database::{
    EventChanges, MemoryStore, PostgresStore, RankingInput, Store, VoteSettlement,
};
pub use engine::{
    default_catalog, BadgeEvaluator, EventManager, NewEvent, RankingRecalculator,
    SettlementOrchestrator, SettlementResult, VoteLedger, MIN_PREDICTIONS_FOR_RANKING,
    SETTLEMENT_CHUNK_SIZE,
};
pub use error::{EngineError, StoreError};
pub use model::{
    Badge, BadgeCriteria, BadgeTier, Confidence, Event, EventStatus, LeaderboardEntry,
    PlatformStats, Prediction, Profile, UserBadge, UserStats, Vote,
};
pub use trust::{
    apply_trust_delta, confidence_factor, settlement_delta, tier_of, vote_weight, ScoreDelta,
    TrustTier,
};
