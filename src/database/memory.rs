//! In-memory store.
//!
//! Serves two roles: the fallback backend when Postgres is disabled in
//! configuration, and the backend the test suite runs against. A single
//! mutex around the whole dataset gives every multi-row operation the same
//! atomicity the Postgres backend gets from transactions, and the
//! (user, event) map plays the role of the uniqueness constraint.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use async_trait::async_trait;

use crate::database::{EventChanges, RankingInput, Store, VoteSettlement};
use crate::engine::badges::default_catalog;
use crate::error::StoreError;
use crate::model::{
    Badge, Event, EventStatus, LeaderboardEntry, PlatformStats, Prediction, Profile, UserBadge,
    UserStats, Vote,
};
use crate::trust::apply_trust_delta;

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, Profile>,
    events: HashMap<Uuid, Event>,
    votes: HashMap<Uuid, Vote>,
    vote_by_pair: HashMap<(String, Uuid), Uuid>,
    stats: HashMap<String, UserStats>,
    catalog: Vec<Badge>,
    user_badges: Vec<UserBadge>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let inner = Inner {
            catalog: default_catalog(),
            ..Inner::default()
        };
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.profiles.get(user_id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.events.get(&event_id).cloned())
    }

    async fn list_events(&self, status: Option<EventStatus>) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn update_event_details(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let event = inner.events.get_mut(&event_id).ok_or(StoreError::NotFound)?;
        if let Some(title) = &changes.title {
            event.title = title.clone();
        }
        if let Some(description) = &changes.description {
            event.description = Some(description.clone());
        }
        if let Some(deadline) = changes.deadline {
            event.deadline = deadline;
        }
        if let Some(resolution_date) = changes.resolution_date {
            event.resolution_date = Some(resolution_date);
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        event_id: Uuid,
        from: &[EventStatus],
        to: EventStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let event = inner.events.get_mut(&event_id).ok_or(StoreError::NotFound)?;
        if from.contains(&event.status) {
            event.status = to;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn claim_settlement(
        &self,
        event_id: Uuid,
        outcome: Prediction,
        settled_by: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let event = inner.events.get_mut(&event_id).ok_or(StoreError::NotFound)?;
        if event.status != EventStatus::Closed {
            return Ok(false);
        }
        event.status = EventStatus::Settled;
        event.outcome = Some(outcome);
        event.settled_by = Some(settled_by.to_string());
        event.settled_at = Some(Utc::now());
        Ok(true)
    }

    async fn record_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        let pair = (vote.user_id.clone(), vote.event_id);
        if inner.vote_by_pair.contains_key(&pair) {
            return Err(StoreError::DuplicateVote);
        }

        let event = inner
            .events
            .get_mut(&vote.event_id)
            .ok_or(StoreError::NotFound)?;
        if event.status != EventStatus::Active {
            return Err(StoreError::EventNotActive);
        }

        match vote.prediction {
            Prediction::Yes => {
                event.yes_count += 1;
                event.weighted_yes += vote.weight;
            }
            Prediction::No => {
                event.no_count += 1;
                event.weighted_no += vote.weight;
            }
        }

        inner.vote_by_pair.insert(pair, vote.id);
        inner.votes.insert(vote.id, vote.clone());
        Ok(())
    }

    async fn get_vote(&self, user_id: &str, event_id: Uuid) -> Result<Option<Vote>, StoreError> {
        let inner = self.inner.lock().await;
        let id = inner.vote_by_pair.get(&(user_id.to_string(), event_id));
        Ok(id.and_then(|id| inner.votes.get(id).cloned()))
    }

    async fn list_votes(&self, event_id: Uuid) -> Result<Vec<Vote>, StoreError> {
        let inner = self.inner.lock().await;
        let mut votes: Vec<Vote> = inner
            .votes
            .values()
            .filter(|v| v.event_id == event_id)
            .cloned()
            .collect();
        votes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(votes)
    }

    async fn unsettled_votes(&self, event_id: Uuid, limit: i64) -> Result<Vec<Vote>, StoreError> {
        let inner = self.inner.lock().await;
        let mut votes: Vec<Vote> = inner
            .votes
            .values()
            .filter(|v| v.event_id == event_id && v.is_correct.is_none())
            .cloned()
            .collect();
        votes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        votes.truncate(limit.max(0) as usize);
        Ok(votes)
    }

    async fn voter_ids(&self, event_id: Uuid) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        let mut ids: Vec<String> = inner
            .votes
            .values()
            .filter(|v| v.event_id == event_id)
            .map(|v| v.user_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn apply_settlements(&self, updates: &[VoteSettlement]) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let mut scored = 0u64;

        for update in updates {
            // Skip votes another (crashed or concurrent) run already scored.
            match inner.votes.get_mut(&update.vote_id) {
                Some(vote) if vote.is_correct.is_none() => {
                    vote.is_correct = Some(update.is_correct);
                }
                _ => continue,
            }

            if let Some(profile) = inner.profiles.get_mut(&update.user_id) {
                profile.trust_score = apply_trust_delta(profile.trust_score, update.trust_delta);
            }

            let stats = inner
                .stats
                .entry(update.user_id.clone())
                .or_insert_with(|| UserStats::empty(update.user_id.clone()));
            stats.total_predictions += 1;
            if update.is_correct {
                stats.correct_predictions += 1;
                stats.current_streak += 1;
                stats.best_streak = stats.best_streak.max(stats.current_streak);
            } else {
                stats.current_streak = 0;
            }
            stats.xp += update.xp_delta;
            stats.updated_at = Utc::now();

            scored += 1;
        }

        Ok(scored)
    }

    async fn get_stats(&self, user_id: &str) -> Result<Option<UserStats>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.stats.get(user_id).cloned())
    }

    async fn badge_catalog(&self) -> Result<Vec<Badge>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.catalog.clone())
    }

    async fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .user_badges
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let held = inner
            .user_badges
            .iter()
            .any(|b| b.user_id == user_id && b.badge_id == badge_id);
        if held {
            return Ok(false);
        }
        inner.user_badges.push(UserBadge {
            user_id: user_id.to_string(),
            badge_id: badge_id.to_string(),
            earned_at: Utc::now(),
        });
        Ok(true)
    }

    async fn ranking_inputs(&self, min_predictions: i64) -> Result<Vec<RankingInput>, StoreError> {
        let inner = self.inner.lock().await;
        let mut inputs = Vec::new();
        for stats in inner.stats.values() {
            if stats.total_predictions < min_predictions {
                continue;
            }
            if let Some(profile) = inner.profiles.get(&stats.user_id) {
                inputs.push(RankingInput {
                    user_id: stats.user_id.clone(),
                    trust_score: profile.trust_score,
                    correct_predictions: stats.correct_predictions,
                    total_predictions: stats.total_predictions,
                    created_at: profile.created_at,
                });
            }
        }
        Ok(inputs)
    }

    async fn write_ranks(
        &self,
        ranks: &[(String, i64)],
        _min_predictions: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        for stats in inner.stats.values_mut() {
            stats.rank = None;
        }
        for (user_id, rank) in ranks {
            if let Some(stats) = inner.stats.get_mut(user_id) {
                stats.rank = Some(*rank);
            }
        }
        Ok(())
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let inner = self.inner.lock().await;
        let mut entries = Vec::new();
        for stats in inner.stats.values() {
            let Some(rank) = stats.rank else { continue };
            let Some(profile) = inner.profiles.get(&stats.user_id) else {
                continue;
            };
            let badge_count = inner
                .user_badges
                .iter()
                .filter(|b| b.user_id == stats.user_id)
                .count() as i64;
            entries.push(LeaderboardEntry {
                rank,
                user_id: stats.user_id.clone(),
                username: profile.username.clone(),
                trust_score: profile.trust_score,
                total_predictions: stats.total_predictions,
                correct_predictions: stats.correct_predictions,
                accuracy_pct: stats.accuracy().unwrap_or(0.0) * 100.0,
                current_streak: stats.current_streak,
                best_streak: stats.best_streak,
                badge_count,
            });
        }
        entries.sort_by_key(|e| e.rank);
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    async fn platform_stats(&self) -> Result<PlatformStats, StoreError> {
        let inner = self.inner.lock().await;
        Ok(PlatformStats {
            total_users: inner.profiles.len() as i64,
            active_events: inner
                .events
                .values()
                .filter(|e| e.status == EventStatus::Active)
                .count() as i64,
            settled_events: inner
                .events
                .values()
                .filter(|e| e.status == EventStatus::Settled)
                .count() as i64,
            total_votes: inner.votes.len() as i64,
        })
    }
}
