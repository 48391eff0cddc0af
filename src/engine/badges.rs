//! Badge catalog and award evaluation.
//!
//! Awards are append-only: criteria are checked against `best_streak` and
//! other high-water marks, so a badge once earned can never be retracted by
//! a later losing streak. The store's (user, badge) uniqueness makes
//! re-evaluation a no-op.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::database::Store;
use crate::engine::MIN_PREDICTIONS_FOR_RANKING;
use crate::error::EngineError;
use crate::model::{Badge, BadgeCriteria, BadgeTier, UserStats};

/// The static catalog. Seeded into the store at initialization; ids are
/// stable slugs referenced by award records.
pub fn default_catalog() -> Vec<Badge> {
    fn badge(
        id: &str,
        name: &str,
        description: &str,
        tier: BadgeTier,
        criteria: BadgeCriteria,
        criteria_value: f64,
    ) -> Badge {
        Badge {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            tier,
            criteria,
            criteria_value,
        }
    }

    vec![
        badge(
            "first-steps",
            "First Steps",
            "Cast your first prediction",
            BadgeTier::Bronze,
            BadgeCriteria::FirstVote,
            1.0,
        ),
        badge(
            "regular-voter",
            "Regular Voter",
            "Make 10 predictions",
            BadgeTier::Bronze,
            BadgeCriteria::Votes,
            10.0,
        ),
        badge(
            "dedicated-voter",
            "Dedicated Voter",
            "Make 50 predictions",
            BadgeTier::Silver,
            BadgeCriteria::Votes,
            50.0,
        ),
        badge(
            "prediction-machine",
            "Prediction Machine",
            "Make 250 predictions",
            BadgeTier::Gold,
            BadgeCriteria::Votes,
            250.0,
        ),
        badge(
            "market-fixture",
            "Market Fixture",
            "Make 1000 predictions",
            BadgeTier::Platinum,
            BadgeCriteria::Votes,
            1000.0,
        ),
        badge(
            "on-a-roll",
            "On a Roll",
            "Get 3 predictions right in a row",
            BadgeTier::Bronze,
            BadgeCriteria::Streak,
            3.0,
        ),
        badge(
            "hot-streak",
            "Hot Streak",
            "Get 5 predictions right in a row",
            BadgeTier::Silver,
            BadgeCriteria::Streak,
            5.0,
        ),
        badge(
            "unstoppable",
            "Unstoppable",
            "Get 10 predictions right in a row",
            BadgeTier::Gold,
            BadgeCriteria::Streak,
            10.0,
        ),
        badge(
            "prophetic",
            "Prophetic",
            "Get 20 predictions right in a row",
            BadgeTier::Platinum,
            BadgeCriteria::Streak,
            20.0,
        ),
        badge(
            "sharp-eye",
            "Sharp Eye",
            "Hold 55% accuracy",
            BadgeTier::Bronze,
            BadgeCriteria::Accuracy,
            0.55,
        ),
        badge(
            "keen-judgement",
            "Keen Judgement",
            "Hold 65% accuracy",
            BadgeTier::Silver,
            BadgeCriteria::Accuracy,
            0.65,
        ),
        badge(
            "calibrated",
            "Calibrated",
            "Hold 75% accuracy",
            BadgeTier::Gold,
            BadgeCriteria::Accuracy,
            0.75,
        ),
        badge(
            "oracle-grade",
            "Oracle Grade",
            "Hold 85% accuracy",
            BadgeTier::Platinum,
            BadgeCriteria::Accuracy,
            0.85,
        ),
        badge(
            "top-ten",
            "Top Ten",
            "Reach the leaderboard top 10",
            BadgeTier::Silver,
            BadgeCriteria::Rank,
            10.0,
        ),
        badge(
            "podium-finish",
            "Podium Finish",
            "Reach the leaderboard top 3",
            BadgeTier::Gold,
            BadgeCriteria::Rank,
            3.0,
        ),
        badge(
            "number-one",
            "Number One",
            "Top the leaderboard",
            BadgeTier::Platinum,
            BadgeCriteria::Rank,
            1.0,
        ),
    ]
}

pub struct BadgeEvaluator {
    store: Arc<dyn Store>,
    min_predictions: i64,
}

impl BadgeEvaluator {
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

    /// Award every catalog badge the user now qualifies for and does not
    /// already hold. Returns the newly awarded badge ids.
    pub async fn evaluate(&self, user_id: &str) -> Result<Vec<String>, EngineError> {
        let stats = self
            .store
            .get_stats(user_id)
            .await?
            .unwrap_or_else(|| UserStats::empty(user_id));

        let held: HashSet<String> = self
            .store
            .user_badges(user_id)
            .await?
            .into_iter()
            .map(|b| b.badge_id)
            .collect();

        let mut awarded = Vec::new();
        for badge in self.store.badge_catalog().await? {
            if held.contains(&badge.id) {
                continue;
            }
            if !self.meets(&badge, &stats) {
                continue;
            }
            if self.store.award_badge(user_id, &badge.id).await? {
                debug!(user_id = %user_id, badge_id = %badge.id, "Badge awarded");
                awarded.push(badge.id);
            }
        }

        Ok(awarded)
    }

    fn meets(&self, badge: &Badge, stats: &UserStats) -> bool {
        match badge.criteria {
            BadgeCriteria::FirstVote => stats.total_predictions >= 1,
            BadgeCriteria::Votes => stats.total_predictions >= badge.criteria_value as i64,
            BadgeCriteria::Streak => stats.best_streak >= badge.criteria_value as i64,
            BadgeCriteria::Accuracy => {
                stats.total_predictions >= self.min_predictions
                    && stats.accuracy().is_some_and(|a| a >= badge.criteria_value)
            }
            BadgeCriteria::Rank => stats.rank.is_some_and(|r| r <= badge.criteria_value as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::model::Profile;

    fn stats(total: i64, correct: i64, best_streak: i64, rank: Option<i64>) -> UserStats {
        UserStats {
            total_predictions: total,
            correct_predictions: correct,
            best_streak,
            rank,
            ..UserStats::empty("user_1")
        }
    }

    fn evaluator_for(store: Arc<MemoryStore>) -> BadgeEvaluator {
        BadgeEvaluator::new(store)
    }

    #[test]
    fn test_catalog_covers_every_criteria_type() {
        let catalog = default_catalog();
        for criteria in [
            BadgeCriteria::FirstVote,
            BadgeCriteria::Votes,
            BadgeCriteria::Streak,
            BadgeCriteria::Accuracy,
            BadgeCriteria::Rank,
        ] {
            assert!(
                catalog.iter().any(|b| b.criteria == criteria),
                "no badge for {criteria:?}"
            );
        }
    }

    #[test]
    fn test_criteria_checks() {
        let store = Arc::new(MemoryStore::new());
        let evaluator = evaluator_for(store);
        let catalog = default_catalog();
        let by_id = |id: &str| catalog.iter().find(|b| b.id == id).unwrap();

        assert!(evaluator.meets(by_id("first-steps"), &stats(1, 0, 0, None)));
        assert!(!evaluator.meets(by_id("first-steps"), &stats(0, 0, 0, None)));

        assert!(evaluator.meets(by_id("regular-voter"), &stats(10, 2, 0, None)));
        assert!(!evaluator.meets(by_id("regular-voter"), &stats(9, 9, 9, None)));

        // Streak badges key off the best streak, not the current one.
        assert!(evaluator.meets(by_id("hot-streak"), &stats(20, 10, 5, None)));
        assert!(!evaluator.meets(by_id("hot-streak"), &stats(20, 10, 4, None)));

        // Accuracy requires the ranking floor as well as the ratio.
        assert!(evaluator.meets(by_id("calibrated"), &stats(8, 6, 0, None)));
        assert!(!evaluator.meets(by_id("calibrated"), &stats(4, 4, 0, None)));

        assert!(evaluator.meets(by_id("podium-finish"), &stats(10, 5, 0, Some(3))));
        assert!(!evaluator.meets(by_id("podium-finish"), &stats(10, 5, 0, Some(4))));
        assert!(!evaluator.meets(by_id("podium-finish"), &stats(10, 5, 0, None)));
    }

    #[tokio::test]
    async fn test_evaluate_without_stats_awards_nothing() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_profile(&Profile::new("user_1", "alice"))
            .await
            .unwrap();

        let evaluator = BadgeEvaluator::new(store);
        assert!(evaluator.evaluate("user_1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_award_is_insert_if_absent() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_profile(&Profile::new("user_1", "alice"))
            .await
            .unwrap();

        assert!(store.award_badge("user_1", "first-steps").await.unwrap());
        assert!(!store.award_badge("user_1", "first-steps").await.unwrap());
        assert_eq!(store.user_badges("user_1").await.unwrap().len(), 1);
    }
}
