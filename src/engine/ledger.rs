//! Vote casting.
//!
//! Preconditions are checked in a fixed order so the caller always sees the
//! first failing reason. The ordered checks are advisory under concurrency;
//! the store's uniqueness constraint and its status-guarded aggregate bump
//! are what actually hold under racing callers.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::database::Store;
use crate::error::{EngineError, StoreError};
use crate::model::{Confidence, EventStatus, Prediction, Vote};
use crate::trust::vote_weight;

pub struct VoteLedger {
    store: Arc<dyn Store>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a vote on an active event.
    ///
    /// The caller's trust score is snapshotted and the weight computed from
    /// it here, at cast time; neither is ever revised. The vote row and the
    /// aggregate bump commit together or not at all.
    pub async fn cast_vote(
        &self,
        user_id: &str,
        event_id: Uuid,
        prediction: Prediction,
        confidence: Confidence,
    ) -> Result<Vote, EngineError> {
        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or(EngineError::ProfileNotFound)?;
        if profile.is_banned {
            return Err(EngineError::Banned);
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(EngineError::EventNotFound)?;
        if event.status != EventStatus::Active {
            return Err(EngineError::EventNotActive);
        }
        if Utc::now() >= event.deadline {
            return Err(EngineError::DeadlinePassed);
        }

        if self.store.get_vote(user_id, event_id).await?.is_some() {
            return Err(EngineError::AlreadyVoted);
        }

        let vote = Vote {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            event_id,
            prediction,
            confidence,
            trust_score_at_vote: profile.trust_score,
            weight: vote_weight(profile.trust_score, confidence),
            is_correct: None,
            created_at: Utc::now(),
        };

        match self.store.record_vote(&vote).await {
            Ok(()) => {
                debug!(
                    user_id = %user_id,
                    event_id = %event_id,
                    prediction = ?prediction,
                    weight = vote.weight,
                    "Vote cast"
                );
                Ok(vote)
            }
            // Lost a same-pair race: the constraint, not the pre-check, is
            // the authority.
            Err(StoreError::DuplicateVote) => Err(EngineError::AlreadyVoted),
            // The event left `active` between the check and the write.
            Err(StoreError::EventNotActive) => Err(EngineError::EventNotActive),
            Err(e) => Err(e.into()),
        }
    }

    /// The caller's vote on an event, if any.
    pub async fn user_vote(
        &self,
        user_id: &str,
        event_id: Uuid,
    ) -> Result<Option<Vote>, EngineError> {
        Ok(self.store.get_vote(user_id, event_id).await?)
    }
}
