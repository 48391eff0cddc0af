//! Integration tests for the CrowdOracle engine.
//!
//! These run the full vote -> close -> settle pipeline against the
//! in-memory store and verify the invariants the engine promises:
//! aggregate conservation, double-vote exclusion, settlement idempotence,
//! reward/penalty asymmetry, badge monotonicity, and ranking determinism.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crowd_oracle::{
    Confidence, EngineError, Event, EventManager, EventStatus, MemoryStore, NewEvent, Prediction,
    Profile, SettlementOrchestrator, SettlementResult, Store, Vote, VoteLedger,
};

// ============================================================================
// Test Helpers
// ============================================================================

const ADMIN: &str = "admin_1";

struct Harness {
    store: Arc<MemoryStore>,
    ledger: Arc<VoteLedger>,
    events: EventManager,
    settlement: SettlementOrchestrator,
}

impl Harness {
    /// Fresh store with a registered admin, default scoring settings.
    async fn new() -> Self {
        Self::with_ranking_floor(crowd_oracle::MIN_PREDICTIONS_FOR_RANKING).await
    }

    /// Same, but with a custom minimum-predictions floor so ranking tests
    /// do not need five settled events per user.
    async fn with_ranking_floor(floor: i64) -> Self {
        let store = Arc::new(MemoryStore::new());

        let mut admin = Profile::new(ADMIN, "admin");
        admin.is_admin = true;
        store.insert_profile(&admin).await.unwrap();

        let dyn_store: Arc<dyn Store> = store.clone();
        Self {
            ledger: Arc::new(VoteLedger::new(dyn_store.clone())),
            events: EventManager::new(dyn_store.clone()),
            settlement: SettlementOrchestrator::new(dyn_store).with_min_predictions(floor),
            store,
        }
    }

    async fn add_user(&self, id: &str, trust_score: f64) {
        let mut profile = Profile::new(id, id);
        profile.trust_score = trust_score;
        self.store.insert_profile(&profile).await.unwrap();
    }

    async fn active_event(&self, title: &str) -> Event {
        self.events
            .create_event(
                ADMIN,
                NewEvent {
                    title: title.to_string(),
                    description: None,
                    deadline: Utc::now() + Duration::days(7),
                    resolution_date: None,
                    activate: true,
                },
            )
            .await
            .unwrap()
    }

    async fn vote(
        &self,
        user_id: &str,
        event_id: Uuid,
        prediction: Prediction,
        confidence: Confidence,
    ) -> Vote {
        self.ledger
            .cast_vote(user_id, event_id, prediction, confidence)
            .await
            .unwrap()
    }

    async fn close_and_settle(&self, event_id: Uuid, outcome: Prediction) -> SettlementResult {
        self.events.close(ADMIN, event_id).await.unwrap();
        self.settlement.settle(event_id, outcome, ADMIN).await.unwrap()
    }

    async fn trust_of(&self, user_id: &str) -> f64 {
        self.store
            .get_profile(user_id)
            .await
            .unwrap()
            .unwrap()
            .trust_score
    }

    /// Run one full event where every listed user votes `prediction` and
    /// the event settles with `outcome`.
    async fn settle_round(
        &self,
        votes: &[(&str, Prediction, Confidence)],
        outcome: Prediction,
    ) -> SettlementResult {
        let event = self.active_event("round").await;
        for (user_id, prediction, confidence) in votes {
            self.vote(user_id, event.id, *prediction, *confidence).await;
        }
        self.close_and_settle(event.id, outcome).await
    }
}

fn close_f64(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// Voting
// ============================================================================

mod voting {
    use super::*;

    #[tokio::test]
    async fn test_vote_updates_both_aggregate_scales() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await; // reliable tier, x1.0

        // Event with prior weighted tallies of 10 yes / 5 no.
        let mut event = h.active_event("prior").await;
        event.yes_count = 12;
        event.no_count = 7;
        event.weighted_yes = 10.0;
        event.weighted_no = 5.0;
        h.store.insert_event(&event).await.unwrap();

        let vote = h
            .vote("alice", event.id, Prediction::Yes, Confidence::High)
            .await;
        assert_eq!(vote.weight, 1.0);
        assert_eq!(vote.trust_score_at_vote, 0.70);

        let after = h.store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(after.yes_count, 13);
        assert_eq!(after.no_count, 7);
        assert!(close_f64(after.weighted_yes, 11.0));
        assert!(close_f64(after.weighted_no, 5.0));
    }

    #[tokio::test]
    async fn test_aggregates_conserve_vote_totals() {
        let h = Harness::new().await;
        let voters = [
            ("newcomer", 0.30, Prediction::Yes),
            ("regular", 0.60, Prediction::No),
            ("reliable", 0.70, Prediction::Yes),
            ("expert", 0.80, Prediction::No),
            ("superforecaster", 0.90, Prediction::Yes),
        ];
        for (id, trust, _) in &voters {
            h.add_user(id, *trust).await;
        }

        let event = h.active_event("conservation").await;
        for (id, _, prediction) in &voters {
            h.vote(id, event.id, *prediction, Confidence::Medium).await;
        }

        let after = h.store.get_event(event.id).await.unwrap().unwrap();
        let votes = h.store.list_votes(event.id).await.unwrap();

        assert_eq!(after.total_votes(), votes.len() as i64);
        let weight_sum: f64 = votes.iter().map(|v| v.weight).sum();
        assert!(close_f64(after.total_weight(), weight_sum));
        // 0.5 + 0.8 + 1.0 + 1.5 + 2.0 across the five tiers
        assert!(close_f64(weight_sum, 5.8));
    }

    #[tokio::test]
    async fn test_banned_user_cannot_vote() {
        let h = Harness::new().await;
        let mut banned = Profile::new("banned", "banned");
        banned.is_banned = true;
        h.store.insert_profile(&banned).await.unwrap();

        let event = h.active_event("banned").await;
        let err = h
            .ledger
            .cast_vote("banned", event.id, Prediction::Yes, Confidence::Low)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Banned));
    }

    #[tokio::test]
    async fn test_draft_event_rejects_votes() {
        let h = Harness::new().await;
        h.add_user("alice", 0.5).await;

        let draft = h
            .events
            .create_event(
                ADMIN,
                NewEvent {
                    title: "draft".to_string(),
                    description: None,
                    deadline: Utc::now() + Duration::days(7),
                    resolution_date: None,
                    activate: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(draft.status, EventStatus::Draft);

        let err = h
            .ledger
            .cast_vote("alice", draft.id, Prediction::Yes, Confidence::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EventNotActive));
    }

    #[tokio::test]
    async fn test_deadline_is_checked_at_acceptance() {
        let h = Harness::new().await;
        h.add_user("alice", 0.5).await;

        // Active event whose deadline already passed.
        let mut event = h.active_event("expired").await;
        event.deadline = Utc::now() - Duration::minutes(1);
        h.store.insert_event(&event).await.unwrap();

        let err = h
            .ledger
            .cast_vote("alice", event.id, Prediction::Yes, Confidence::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DeadlinePassed));
    }

    #[tokio::test]
    async fn test_second_vote_rejected() {
        let h = Harness::new().await;
        h.add_user("alice", 0.5).await;
        let event = h.active_event("double").await;

        h.vote("alice", event.id, Prediction::Yes, Confidence::Low).await;
        let err = h
            .ledger
            .cast_vote("alice", event.id, Prediction::No, Confidence::High)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyVoted));

        // The original vote is untouched.
        let vote = h.store.get_vote("alice", event.id).await.unwrap().unwrap();
        assert_eq!(vote.prediction, Prediction::Yes);
    }

    #[tokio::test]
    async fn test_concurrent_double_vote_exactly_one_wins() {
        let h = Harness::new().await;
        h.add_user("alice", 0.5).await;
        let event = h.active_event("race").await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = h.ledger.clone();
            let event_id = event.id;
            handles.push(tokio::spawn(async move {
                ledger
                    .cast_vote("alice", event_id, Prediction::Yes, Confidence::Medium)
                    .await
            }));
        }

        let mut wins = 0;
        let mut already_voted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(EngineError::AlreadyVoted) => already_voted += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(already_voted, 7);

        let after = h.store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(after.total_votes(), 1);
    }
}

// ============================================================================
// Settlement
// ============================================================================

mod settlement {
    use super::*;

    #[tokio::test]
    async fn test_correct_vote_rewards_and_extends_streak() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;

        let event = h.active_event("reward").await;
        h.vote("alice", event.id, Prediction::Yes, Confidence::High).await;
        let result = h.close_and_settle(event.id, Prediction::Yes).await;

        assert_eq!(result.votes_scored, 1);
        assert!(!result.already_settled);

        // +2.0 x (99/50) = +3.96 points on the 0-100 scale
        assert!(close_f64(h.trust_of("alice").await, 0.7396));

        let vote = h.store.get_vote("alice", event.id).await.unwrap().unwrap();
        assert_eq!(vote.is_correct, Some(true));

        let stats = h.store.get_stats("alice").await.unwrap().unwrap();
        assert_eq!(stats.total_predictions, 1);
        assert_eq!(stats.correct_predictions, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_streak, 1);
        assert_eq!(stats.xp, 99);
    }

    #[tokio::test]
    async fn test_incorrect_vote_penalizes_and_resets_streak() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;

        let event = h.active_event("penalty").await;
        h.vote("alice", event.id, Prediction::Yes, Confidence::High).await;
        h.close_and_settle(event.id, Prediction::No).await;

        // -3.5 x (99/50) = -6.93 points
        assert!(close_f64(h.trust_of("alice").await, 0.6307));

        let stats = h.store.get_stats("alice").await.unwrap().unwrap();
        assert_eq!(stats.total_predictions, 1);
        assert_eq!(stats.correct_predictions, 0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 0);
        assert_eq!(stats.xp, -74);
    }

    #[tokio::test]
    async fn test_trust_score_clamps_at_zero() {
        let h = Harness::new().await;
        h.add_user("alice", 0.01).await;

        let event = h.active_event("clamp").await;
        h.vote("alice", event.id, Prediction::Yes, Confidence::High).await;
        h.close_and_settle(event.id, Prediction::No).await;

        assert_eq!(h.trust_of("alice").await, 0.0);
    }

    #[tokio::test]
    async fn test_settle_requires_closed_status() {
        let h = Harness::new().await;
        let event = h.active_event("not-closed").await;

        let err = h
            .settlement
            .settle(event.id, Prediction::Yes, ADMIN)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EventNotClosed));
    }

    #[tokio::test]
    async fn test_settle_requires_admin() {
        let h = Harness::new().await;
        h.add_user("alice", 0.5).await;
        let event = h.active_event("not-admin").await;
        h.events.close(ADMIN, event.id).await.unwrap();

        let err = h
            .settlement
            .settle(event.id, Prediction::Yes, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotAuthorized));
    }

    #[tokio::test]
    async fn test_settle_twice_converges_to_identical_state() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;
        h.add_user("bob", 0.60).await;

        let event = h.active_event("idempotent").await;
        h.vote("alice", event.id, Prediction::Yes, Confidence::High).await;
        h.vote("bob", event.id, Prediction::No, Confidence::Low).await;

        let first = h.close_and_settle(event.id, Prediction::Yes).await;
        assert_eq!(first.votes_scored, 2);

        let alice_trust = h.trust_of("alice").await;
        let bob_trust = h.trust_of("bob").await;

        // Second call even disagrees about the outcome; the stored one wins.
        let second = h
            .settlement
            .settle(event.id, Prediction::No, ADMIN)
            .await
            .unwrap();
        assert!(second.already_settled);
        assert_eq!(second.votes_scored, 0);
        assert_eq!(second.outcome, Prediction::Yes);
        assert_eq!(second.badges_awarded, 0);

        assert_eq!(h.trust_of("alice").await, alice_trust);
        assert_eq!(h.trust_of("bob").await, bob_trust);

        let vote = h.store.get_vote("alice", event.id).await.unwrap().unwrap();
        assert_eq!(vote.is_correct, Some(true));
    }

    #[tokio::test]
    async fn test_fan_out_processes_all_chunks() {
        let h = Harness::new().await;
        let store: Arc<dyn Store> = h.store.clone();
        let small_chunks = SettlementOrchestrator::new(store).with_chunk_size(2);

        let event = h.active_event("chunked").await;
        for i in 0..5 {
            let user = format!("voter_{i}");
            h.add_user(&user, 0.70).await;
            h.vote(&user, event.id, Prediction::Yes, Confidence::Medium).await;
        }

        h.events.close(ADMIN, event.id).await.unwrap();
        let result = small_chunks
            .settle(event.id, Prediction::Yes, ADMIN)
            .await
            .unwrap();

        assert_eq!(result.votes_scored, 5);
        for vote in h.store.list_votes(event.id).await.unwrap() {
            assert_eq!(vote.is_correct, Some(true));
        }
    }

    #[tokio::test]
    async fn test_cancelled_event_is_never_scored() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;

        let event = h.active_event("cancelled").await;
        h.vote("alice", event.id, Prediction::Yes, Confidence::High).await;

        let before = h.store.get_event(event.id).await.unwrap().unwrap();
        h.events.cancel(ADMIN, event.id).await.unwrap();

        // Settlement is impossible from a terminal status.
        let err = h
            .settlement
            .settle(event.id, Prediction::Yes, ADMIN)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EventNotClosed));

        // Aggregates frozen exactly as last recorded, nobody scored.
        let after = h.store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(after.yes_count, before.yes_count);
        assert!(close_f64(after.weighted_yes, before.weighted_yes));
        assert_eq!(after.outcome, None);

        let vote = h.store.get_vote("alice", event.id).await.unwrap().unwrap();
        assert_eq!(vote.is_correct, None);
        assert_eq!(h.trust_of("alice").await, 0.70);
    }

    #[tokio::test]
    async fn test_votes_after_settlement_are_rejected() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;
        h.add_user("late", 0.70).await;

        let event = h.active_event("late-vote").await;
        h.vote("alice", event.id, Prediction::Yes, Confidence::Medium).await;
        h.close_and_settle(event.id, Prediction::Yes).await;

        let err = h
            .ledger
            .cast_vote("late", event.id, Prediction::Yes, Confidence::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EventNotActive));
    }
}

// ============================================================================
// Ranking & Badges
// ============================================================================

mod ranking_and_badges {
    use super::*;

    #[tokio::test]
    async fn test_users_below_floor_stay_unranked() {
        let h = Harness::new().await; // default floor of 5
        h.add_user("alice", 0.70).await;

        h.settle_round(
            &[("alice", Prediction::Yes, Confidence::Medium)],
            Prediction::Yes,
        )
        .await;

        let stats = h.store.get_stats("alice").await.unwrap().unwrap();
        assert_eq!(stats.total_predictions, 1);
        assert_eq!(stats.rank, None);
    }

    #[tokio::test]
    async fn test_ranking_orders_by_trust_then_accuracy() {
        let h = Harness::with_ranking_floor(1).await;
        h.add_user("strong", 0.80).await;
        h.add_user("weak", 0.40).await;

        // strong predicts correctly, weak incorrectly.
        h.settle_round(
            &[
                ("strong", Prediction::Yes, Confidence::Medium),
                ("weak", Prediction::No, Confidence::Medium),
            ],
            Prediction::Yes,
        )
        .await;

        let strong = h.store.get_stats("strong").await.unwrap().unwrap();
        let weak = h.store.get_stats("weak").await.unwrap().unwrap();
        assert_eq!(strong.rank, Some(1));
        assert_eq!(weak.rank, Some(2));

        let board = h.store.leaderboard(10).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "strong");
        assert_eq!(board[0].rank, 1);
    }

    #[tokio::test]
    async fn test_first_vote_badge_awarded_once() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;

        let first = h
            .settle_round(
                &[("alice", Prediction::Yes, Confidence::Medium)],
                Prediction::Yes,
            )
            .await;
        assert!(first.badges_awarded >= 1);

        let badges = h.store.user_badges("alice").await.unwrap();
        assert!(badges.iter().any(|b| b.badge_id == "first-steps"));

        // A second settled event does not re-award it.
        h.settle_round(
            &[("alice", Prediction::Yes, Confidence::Medium)],
            Prediction::Yes,
        )
        .await;
        let badges = h.store.user_badges("alice").await.unwrap();
        assert_eq!(
            badges.iter().filter(|b| b.badge_id == "first-steps").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_streak_badge_survives_broken_streak() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;

        // Three correct predictions in a row earn the streak badge.
        for _ in 0..3 {
            h.settle_round(
                &[("alice", Prediction::Yes, Confidence::Low)],
                Prediction::Yes,
            )
            .await;
        }
        let stats = h.store.get_stats("alice").await.unwrap().unwrap();
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.best_streak, 3);
        let badges = h.store.user_badges("alice").await.unwrap();
        assert!(badges.iter().any(|b| b.badge_id == "on-a-roll"));

        // A wrong prediction resets the current streak but retracts nothing.
        h.settle_round(
            &[("alice", Prediction::Yes, Confidence::Low)],
            Prediction::No,
        )
        .await;
        let stats = h.store.get_stats("alice").await.unwrap().unwrap();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 3);
        let badges = h.store.user_badges("alice").await.unwrap();
        assert!(badges.iter().any(|b| b.badge_id == "on-a-roll"));
    }

    #[tokio::test]
    async fn test_rank_badges_follow_fresh_rankings() {
        let h = Harness::with_ranking_floor(1).await;
        h.add_user("winner", 0.90).await;

        h.settle_round(
            &[("winner", Prediction::Yes, Confidence::High)],
            Prediction::Yes,
        )
        .await;

        let badges = h.store.user_badges("winner").await.unwrap();
        for expected in ["number-one", "podium-finish", "top-ten"] {
            assert!(
                badges.iter().any(|b| b.badge_id == expected),
                "missing {expected}"
            );
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

mod wire_format {
    use super::*;

    #[test]
    fn test_enums_serialize_as_lowercase_strings() {
        assert_eq!(
            serde_json::to_string(&Prediction::Yes).unwrap(),
            "\"yes\""
        );
        assert_eq!(
            serde_json::to_string(&Confidence::High).unwrap(),
            "\"high\""
        );
        assert_eq!(
            serde_json::to_string(&EventStatus::Settled).unwrap(),
            "\"settled\""
        );
    }

    #[tokio::test]
    async fn test_vote_serializes_its_snapshot_fields() {
        let h = Harness::new().await;
        h.add_user("alice", 0.70).await;
        let event = h.active_event("wire").await;
        let vote = h
            .vote("alice", event.id, Prediction::Yes, Confidence::High)
            .await;

        let json = serde_json::to_value(&vote).unwrap();
        assert_eq!(json["prediction"], "yes");
        assert_eq!(json["confidence"], "high");
        assert_eq!(json["trust_score_at_vote"], 0.7);
        assert_eq!(json["weight"], 1.0);
        assert!(json["is_correct"].is_null());
    }
}
