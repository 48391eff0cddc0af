//! PostgreSQL store using sqlx.
//!
//! The (user_id, event_id) unique index on `votes` is the double-vote
//! guard; aggregate columns are bumped with SQL-side increments inside the
//! same transaction as the vote insert, and the settled-status claim is a
//! conditional UPDATE so only one caller can win it.

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use async_trait::async_trait;

use crate::database::{EventChanges, RankingInput, Store, VoteSettlement};
use crate::engine::badges::default_catalog;
use crate::error::StoreError;
use crate::model::{
    Badge, BadgeCriteria, BadgeTier, Confidence, Event, EventStatus, LeaderboardEntry,
    PlatformStats, Prediction, Profile, UserBadge, UserStats, Vote,
};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(connection_string: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables, indexes, and the seed badge catalog.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        info!("Initializing database schema...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id VARCHAR(255) PRIMARY KEY,
                username VARCHAR(255) NOT NULL,
                trust_score DOUBLE PRECISION NOT NULL DEFAULT 0.5,
                is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                is_banned BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                deadline TIMESTAMP WITH TIME ZONE NOT NULL,
                resolution_date TIMESTAMP WITH TIME ZONE,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                outcome BOOLEAN,
                yes_count BIGINT NOT NULL DEFAULT 0,
                no_count BIGINT NOT NULL DEFAULT 0,
                weighted_yes DOUBLE PRECISION NOT NULL DEFAULT 0,
                weighted_no DOUBLE PRECISION NOT NULL DEFAULT 0,
                created_by VARCHAR(255),
                settled_by VARCHAR(255),
                settled_at TIMESTAMP WITH TIME ZONE,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id UUID PRIMARY KEY,
                user_id VARCHAR(255) NOT NULL REFERENCES profiles(id),
                event_id UUID NOT NULL REFERENCES events(id),
                prediction BOOLEAN NOT NULL,
                confidence VARCHAR(10) NOT NULL,
                trust_score_at_vote DOUBLE PRECISION NOT NULL,
                weight DOUBLE PRECISION NOT NULL,
                is_correct BOOLEAN,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                UNIQUE (user_id, event_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_stats (
                user_id VARCHAR(255) PRIMARY KEY REFERENCES profiles(id),
                total_predictions BIGINT NOT NULL DEFAULT 0,
                correct_predictions BIGINT NOT NULL DEFAULT 0,
                current_streak BIGINT NOT NULL DEFAULT 0,
                best_streak BIGINT NOT NULL DEFAULT 0,
                xp BIGINT NOT NULL DEFAULT 0,
                rank BIGINT,
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS badges (
                id VARCHAR(64) PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                tier VARCHAR(10) NOT NULL,
                criteria_type VARCHAR(20) NOT NULL,
                criteria_value DOUBLE PRECISION NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_badges (
                user_id VARCHAR(255) NOT NULL REFERENCES profiles(id),
                badge_id VARCHAR(64) NOT NULL REFERENCES badges(id),
                earned_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                PRIMARY KEY (user_id, badge_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_votes_event_unsettled \
             ON votes(event_id, created_at) WHERE is_correct IS NULL",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_status ON events(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_stats_rank ON user_stats(rank)")
            .execute(&self.pool)
            .await?;

        for badge in default_catalog() {
            sqlx::query(
                r#"
                INSERT INTO badges (id, name, description, tier, criteria_type, criteria_value)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&badge.id)
            .bind(&badge.name)
            .bind(&badge.description)
            .bind(badge.tier.as_str())
            .bind(badge.criteria.as_str())
            .bind(badge.criteria_value)
            .execute(&self.pool)
            .await?;
        }

        info!("Database schema initialized");
        Ok(())
    }
}

fn row_to_profile(row: &PgRow) -> Profile {
    Profile {
        id: row.get("id"),
        username: row.get("username"),
        trust_score: row.get("trust_score"),
        is_admin: row.get("is_admin"),
        is_banned: row.get("is_banned"),
        created_at: row.get("created_at"),
    }
}

fn row_to_event(row: &PgRow) -> Result<Event, StoreError> {
    let status_str: String = row.get("status");
    let status = EventStatus::parse(&status_str)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown event status '{status_str}'")))?;
    let outcome: Option<bool> = row.get("outcome");

    Ok(Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        deadline: row.get("deadline"),
        resolution_date: row.get("resolution_date"),
        status,
        outcome: outcome.map(Prediction::from_bool),
        yes_count: row.get("yes_count"),
        no_count: row.get("no_count"),
        weighted_yes: row.get("weighted_yes"),
        weighted_no: row.get("weighted_no"),
        created_by: row.get("created_by"),
        settled_by: row.get("settled_by"),
        settled_at: row.get("settled_at"),
        created_at: row.get("created_at"),
    })
}

fn row_to_vote(row: &PgRow) -> Result<Vote, StoreError> {
    let confidence_str: String = row.get("confidence");
    let confidence = Confidence::parse(&confidence_str)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown confidence '{confidence_str}'")))?;
    let prediction: bool = row.get("prediction");

    Ok(Vote {
        id: row.get("id"),
        user_id: row.get("user_id"),
        event_id: row.get("event_id"),
        prediction: Prediction::from_bool(prediction),
        confidence,
        trust_score_at_vote: row.get("trust_score_at_vote"),
        weight: row.get("weight"),
        is_correct: row.get("is_correct"),
        created_at: row.get("created_at"),
    })
}

fn row_to_badge(row: &PgRow) -> Result<Badge, StoreError> {
    let tier_str: String = row.get("tier");
    let criteria_str: String = row.get("criteria_type");
    Ok(Badge {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        tier: BadgeTier::parse(&tier_str)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown badge tier '{tier_str}'")))?,
        criteria: BadgeCriteria::parse(&criteria_str).ok_or_else(|| {
            StoreError::Corrupt(format!("unknown badge criteria '{criteria_str}'"))
        })?,
        criteria_value: row.get("criteria_value"),
    })
}

const VOTE_COLUMNS: &str = "id, user_id, event_id, prediction, confidence, \
                            trust_score_at_vote, weight, is_correct, created_at";

const EVENT_COLUMNS: &str = "id, title, description, deadline, resolution_date, status, outcome, \
                             yes_count, no_count, weighted_yes, weighted_no, \
                             created_by, settled_by, settled_at, created_at";

#[async_trait]
impl Store for PostgresStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, username, trust_score, is_admin, is_banned, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.username)
        .bind(profile.trust_score)
        .bind(profile.is_admin)
        .bind(profile.is_banned)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, trust_score, is_admin, is_banned, created_at \
             FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_profile(&r)))
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO events
                (id, title, description, deadline, resolution_date, status,
                 yes_count, no_count, weighted_yes, weighted_no, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.deadline)
        .bind(event.resolution_date)
        .bind(event.status.as_str())
        .bind(event.yes_count)
        .bind(event.no_count)
        .bind(event.weighted_yes)
        .bind(event.weighted_no)
        .bind(&event.created_by)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        debug!(event_id = %event.id, "Event created");
        Ok(())
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_event(&r)).transpose()
    }

    async fn list_events(&self, status: Option<EventStatus>) -> Result<Vec<Event>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE status = $1 ORDER BY created_at DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(row_to_event).collect()
    }

    async fn update_event_details(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                deadline = COALESCE($4, deadline),
                resolution_date = COALESCE($5, resolution_date)
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.deadline)
        .bind(changes.resolution_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        event_id: Uuid,
        from: &[EventStatus],
        to: EventStatus,
    ) -> Result<bool, StoreError> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let result = sqlx::query("UPDATE events SET status = $3 WHERE id = $1 AND status = ANY($2)")
            .bind(event_id)
            .bind(&from)
            .bind(to.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn claim_settlement(
        &self,
        event_id: Uuid,
        outcome: Prediction,
        settled_by: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET status = 'settled', outcome = $2, settled_by = $3, settled_at = NOW()
            WHERE id = $1 AND status = 'closed'
            "#,
        )
        .bind(event_id)
        .bind(outcome.as_bool())
        .bind(settled_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let insert = sqlx::query(&format!(
            "INSERT INTO votes ({VOTE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(vote.id)
        .bind(&vote.user_id)
        .bind(vote.event_id)
        .bind(vote.prediction.as_bool())
        .bind(vote.confidence.as_str())
        .bind(vote.trust_score_at_vote)
        .bind(vote.weight)
        .bind(vote.is_correct)
        .bind(vote.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Err(StoreError::DuplicateVote);
                }
            }
            return Err(e.into());
        }

        // Aggregate bump is conditional on the event still being active, so
        // a vote can never land after the status has physically flipped.
        let aggregate_sql = match vote.prediction {
            Prediction::Yes => {
                "UPDATE events SET yes_count = yes_count + 1, weighted_yes = weighted_yes + $2 \
                 WHERE id = $1 AND status = 'active'"
            }
            Prediction::No => {
                "UPDATE events SET no_count = no_count + 1, weighted_no = weighted_no + $2 \
                 WHERE id = $1 AND status = 'active'"
            }
        };
        let updated = sqlx::query(aggregate_sql)
            .bind(vote.event_id)
            .bind(vote.weight)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::EventNotActive);
        }

        tx.commit().await?;
        debug!(user_id = %vote.user_id, event_id = %vote.event_id, "Vote recorded");
        Ok(())
    }

    async fn get_vote(&self, user_id: &str, event_id: Uuid) -> Result<Option<Vote>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE user_id = $1 AND event_id = $2"
        ))
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_vote(&r)).transpose()
    }

    async fn list_votes(&self, event_id: Uuid) -> Result<Vec<Vote>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE event_id = $1 ORDER BY created_at ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_vote).collect()
    }

    async fn unsettled_votes(&self, event_id: Uuid, limit: i64) -> Result<Vec<Vote>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes \
             WHERE event_id = $1 AND is_correct IS NULL \
             ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(event_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_vote).collect()
    }

    async fn voter_ids(&self, event_id: Uuid) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT user_id FROM votes WHERE event_id = $1 ORDER BY user_id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get("user_id")).collect())
    }

    async fn apply_settlements(&self, updates: &[VoteSettlement]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut scored = 0u64;

        for update in updates {
            // Guarded write: a vote already scored by a previous (crashed or
            // concurrent) run is skipped along with its caster's deltas.
            let marked = sqlx::query(
                "UPDATE votes SET is_correct = $2 WHERE id = $1 AND is_correct IS NULL",
            )
            .bind(update.vote_id)
            .bind(update.is_correct)
            .execute(&mut *tx)
            .await?;

            if marked.rows_affected() == 0 {
                continue;
            }

            sqlx::query(
                "UPDATE profiles \
                 SET trust_score = LEAST(1.0, GREATEST(0.0, trust_score + $2)) \
                 WHERE id = $1",
            )
            .bind(&update.user_id)
            .bind(update.trust_delta)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO user_stats (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
                .bind(&update.user_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                UPDATE user_stats SET
                    total_predictions = total_predictions + 1,
                    correct_predictions = correct_predictions + CASE WHEN $2 THEN 1 ELSE 0 END,
                    current_streak = CASE WHEN $2 THEN current_streak + 1 ELSE 0 END,
                    best_streak = GREATEST(best_streak,
                                           CASE WHEN $2 THEN current_streak + 1 ELSE 0 END),
                    xp = xp + $3,
                    updated_at = NOW()
                WHERE user_id = $1
                "#,
            )
            .bind(&update.user_id)
            .bind(update.is_correct)
            .bind(update.xp_delta)
            .execute(&mut *tx)
            .await?;

            scored += 1;
        }

        tx.commit().await?;
        Ok(scored)
    }

    async fn get_stats(&self, user_id: &str) -> Result<Option<UserStats>, StoreError> {
        let row = sqlx::query(
            "SELECT user_id, total_predictions, correct_predictions, current_streak, \
                    best_streak, xp, rank, updated_at \
             FROM user_stats WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserStats {
            user_id: r.get("user_id"),
            total_predictions: r.get("total_predictions"),
            correct_predictions: r.get("correct_predictions"),
            current_streak: r.get("current_streak"),
            best_streak: r.get("best_streak"),
            xp: r.get("xp"),
            rank: r.get("rank"),
            updated_at: r.get("updated_at"),
        }))
    }

    async fn badge_catalog(&self) -> Result<Vec<Badge>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, description, tier, criteria_type, criteria_value \
             FROM badges ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_badge).collect()
    }

    async fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, badge_id, earned_at FROM user_badges \
             WHERE user_id = $1 ORDER BY earned_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| UserBadge {
                user_id: r.get("user_id"),
                badge_id: r.get("badge_id"),
                earned_at: r.get("earned_at"),
            })
            .collect())
    }

    async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO user_badges (user_id, badge_id, earned_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id, badge_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ranking_inputs(&self, min_predictions: i64) -> Result<Vec<RankingInput>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT s.user_id, p.trust_score, s.correct_predictions,
                   s.total_predictions, p.created_at
            FROM user_stats s
            JOIN profiles p ON p.id = s.user_id
            WHERE s.total_predictions >= $1
            "#,
        )
        .bind(min_predictions)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| RankingInput {
                user_id: r.get("user_id"),
                trust_score: r.get("trust_score"),
                correct_predictions: r.get("correct_predictions"),
                total_predictions: r.get("total_predictions"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn write_ranks(
        &self,
        ranks: &[(String, i64)],
        _min_predictions: i64,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE user_stats SET rank = NULL WHERE rank IS NOT NULL")
            .execute(&mut *tx)
            .await?;

        for (user_id, rank) in ranks {
            sqlx::query("UPDATE user_stats SET rank = $2 WHERE user_id = $1")
                .bind(user_id)
                .bind(rank)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(ranked = ranks.len(), "Leaderboard ranks written");
        Ok(())
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT s.rank, s.user_id, p.username, p.trust_score,
                   s.total_predictions, s.correct_predictions,
                   s.current_streak, s.best_streak,
                   (SELECT COUNT(*) FROM user_badges ub WHERE ub.user_id = s.user_id) AS badge_count
            FROM user_stats s
            JOIN profiles p ON p.id = s.user_id
            WHERE s.rank IS NOT NULL
            ORDER BY s.rank ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| {
                let total: i64 = r.get("total_predictions");
                let correct: i64 = r.get("correct_predictions");
                let accuracy_pct = if total > 0 {
                    correct as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                LeaderboardEntry {
                    rank: r.get("rank"),
                    user_id: r.get("user_id"),
                    username: r.get("username"),
                    trust_score: r.get("trust_score"),
                    total_predictions: total,
                    correct_predictions: correct,
                    accuracy_pct,
                    current_streak: r.get("current_streak"),
                    best_streak: r.get("best_streak"),
                    badge_count: r.get("badge_count"),
                }
            })
            .collect())
    }

    async fn platform_stats(&self) -> Result<PlatformStats, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM profiles) AS total_users,
                (SELECT COUNT(*) FROM events WHERE status = 'active') AS active_events,
                (SELECT COUNT(*) FROM events WHERE status = 'settled') AS settled_events,
                (SELECT COUNT(*) FROM votes) AS total_votes
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PlatformStats {
            total_users: row.get("total_users"),
            active_events: row.get("active_events"),
            settled_events: row.get("settled_events"),
            total_votes: row.get("total_votes"),
        })
    }
}
