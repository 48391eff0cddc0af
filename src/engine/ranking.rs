//! Leaderboard recompute.
//!
//! A full recompute over every user above the predictions floor, run once
//! per settlement rather than once per vote. The sort key is a total
//! order, so two recomputes over the same data always produce the same
//! ranking.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::database::{RankingInput, Store};
use crate::engine::MIN_PREDICTIONS_FOR_RANKING;
use crate::error::EngineError;

pub struct RankingRecalculator {
    store: Arc<dyn Store>,
    min_predictions: i64,
}

impl RankingRecalculator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            min_predictions: MIN_PREDICTIONS_FOR_RANKING,
        }
    }

    pub fn with_min_predictions(mut self, min_predictions: i64) -> Self {
        self.min_predictions = min_predictions;
        self
    }

    /// Recompute and persist ranks 1..N over all qualifying users. Users
    /// below the floor end up with no rank.
    pub async fn recompute(&self) -> Result<Vec<(String, i64)>, EngineError> {
        let mut inputs = self.store.ranking_inputs(self.min_predictions).await?;
        inputs.sort_by(compare);

        let ranks: Vec<(String, i64)> = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| (input.user_id.clone(), (i + 1) as i64))
            .collect();

        self.store.write_ranks(&ranks, self.min_predictions).await?;
        debug!(ranked = ranks.len(), "Rankings recomputed");
        Ok(ranks)
    }
}

fn accuracy(input: &RankingInput) -> f64 {
    if input.total_predictions == 0 {
        0.0
    } else {
        input.correct_predictions as f64 / input.total_predictions as f64
    }
}

/// Trust score descending, then accuracy descending, then account age
/// (oldest first), then user id so no tie is ever left to iteration order.
fn compare(a: &RankingInput, b: &RankingInput) -> Ordering {
    b.trust_score
        .partial_cmp(&a.trust_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            accuracy(b)
                .partial_cmp(&accuracy(a))
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.user_id.cmp(&b.user_id))
}
