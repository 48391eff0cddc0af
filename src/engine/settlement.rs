//! Settlement: the closed -> settled saga.
//!
//! The status flip is the commit point and the only atomic, irreversible
//! step; at most one caller ever wins it. The per-vote fan-out that follows
//! is deliberately NOT one giant transaction (an event can carry thousands
//! of votes): it runs in chunks, each chunk committing on its own, and a
//! vote's unset `is_correct` is the work queue. Re-invoking settlement after
//! a crash, timeout, or concurrent call converges to the same end state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::{Store, VoteSettlement};
use crate::engine::badges::BadgeEvaluator;
use crate::engine::ranking::RankingRecalculator;
use crate::engine::SETTLEMENT_CHUNK_SIZE;
use crate::error::{EngineError, StoreError};
use crate::model::{EventStatus, Prediction};
use crate::trust::settlement_delta;

/// Outcome of one `settle` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementResult {
    pub event_id: Uuid,
    pub outcome: Prediction,

    /// True when this call found the event already settled and only resumed
    /// (or verified) the fan-out.
    pub already_settled: bool,

    /// Votes scored by THIS invocation. Zero on a fully converged re-call.
    pub votes_scored: u64,

    /// All votes on the event, from the frozen aggregates.
    pub votes_total: i64,

    /// Badges newly earned by the event's voters.
    pub badges_awarded: u64,
}

pub struct SettlementOrchestrator {
    store: Arc<dyn Store>,
    ranking: RankingRecalculator,
    badges: BadgeEvaluator,
    chunk_size: i64,
}

impl SettlementOrchestrator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            ranking: RankingRecalculator::new(store.clone()),
            badges: BadgeEvaluator::new(store.clone()),
            store,
            chunk_size: SETTLEMENT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: i64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_min_predictions(mut self, min_predictions: i64) -> Self {
        self.ranking = RankingRecalculator::new(self.store.clone())
            .with_min_predictions(min_predictions);
        self.badges =
            BadgeEvaluator::new(self.store.clone()).with_min_predictions(min_predictions);
        self
    }

    /// Settle a closed event with its true outcome.
    ///
    /// Only admins may settle. If the event is already settled the call is
    /// an idempotent resume: the stored outcome is authoritative and the
    /// `outcome` argument is ignored.
    pub async fn settle(
        &self,
        event_id: Uuid,
        outcome: Prediction,
        settled_by: &str,
    ) -> Result<SettlementResult, EngineError> {
        let settler = self
            .store
            .get_profile(settled_by)
            .await?
            .ok_or(EngineError::NotAuthorized)?;
        if !settler.is_admin {
            return Err(EngineError::NotAuthorized);
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(EngineError::EventNotFound)?;

        let (effective_outcome, already_settled) = match event.status {
            EventStatus::Closed => {
                if self
                    .store
                    .claim_settlement(event_id, outcome, settled_by)
                    .await?
                {
                    info!(
                        event_id = %event_id,
                        outcome = ?outcome,
                        settled_by = %settled_by,
                        "Settlement claimed"
                    );
                    (outcome, false)
                } else {
                    // A concurrent caller flipped the status first; fall
                    // through to the resume path with whatever it recorded.
                    self.stored_outcome(event_id).await?
                }
            }
            EventStatus::Settled => self.stored_outcome(event_id).await?,
            _ => return Err(EngineError::EventNotClosed),
        };

        let votes_scored = self.run_fan_out(event_id, effective_outcome).await?;

        // Rankings first so rank-criteria badges see fresh positions.
        self.ranking.recompute().await?;

        let mut badges_awarded = 0u64;
        for user_id in self.store.voter_ids(event_id).await? {
            badges_awarded += self.badges.evaluate(&user_id).await?.len() as u64;
        }

        let settled = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(EngineError::EventNotFound)?;

        info!(
            event_id = %event_id,
            outcome = ?effective_outcome,
            votes_scored,
            badges_awarded,
            already_settled,
            "Event settled"
        );

        Ok(SettlementResult {
            event_id,
            outcome: effective_outcome,
            already_settled,
            votes_scored,
            votes_total: settled.total_votes(),
            badges_awarded,
        })
    }

    /// Read back the outcome the winning claim recorded.
    async fn stored_outcome(
        &self,
        event_id: Uuid,
    ) -> Result<(Prediction, bool), EngineError> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(EngineError::EventNotFound)?;
        match (event.status, event.outcome) {
            (EventStatus::Settled, Some(outcome)) => Ok((outcome, true)),
            (EventStatus::Settled, None) => Err(EngineError::Store(StoreError::Corrupt(
                format!("settled event {event_id} has no outcome"),
            ))),
            _ => Err(EngineError::EventNotClosed),
        }
    }

    /// Score every still-unscored vote in chunks. Each pass re-derives the
    /// remaining work from the store, so it picks up exactly where a
    /// previous run stopped.
    async fn run_fan_out(
        &self,
        event_id: Uuid,
        outcome: Prediction,
    ) -> Result<u64, EngineError> {
        let mut total_scored = 0u64;

        loop {
            let votes = self
                .store
                .unsettled_votes(event_id, self.chunk_size)
                .await?;
            if votes.is_empty() {
                break;
            }

            let updates: Vec<VoteSettlement> = votes
                .iter()
                .map(|vote| {
                    let is_correct = vote.prediction == outcome;
                    let delta = settlement_delta(vote.confidence, is_correct);
                    VoteSettlement {
                        vote_id: vote.id,
                        user_id: vote.user_id.clone(),
                        is_correct,
                        trust_delta: delta.trust_delta,
                        xp_delta: delta.xp_delta,
                    }
                })
                .collect();

            let scored = self.store.apply_settlements(&updates).await?;
            total_scored += scored;
            debug!(
                event_id = %event_id,
                chunk = votes.len(),
                scored,
                "Settlement chunk applied"
            );
        }

        Ok(total_scored)
    }
}
