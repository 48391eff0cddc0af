//! Settlement reward/penalty formulas.
//!
//! Confidence maps to a percent proxy (low 50, medium 75, high 99). A
//! correct call earns +2.0 x (c/50) trust points and +round(10 x (c/10)) XP;
//! a wrong one costs -3.5 x (c/50) points and -round(5 x (c/10) x 1.5) XP.
//! The penalty outweighing the reward at equal confidence is a product rule:
//! being confidently wrong must cost more than being confidently right pays.
//!
//! Trust points are expressed in the 0-100 display scale and converted to
//! the internal [0, 1] representation before clamping.

use crate::model::Confidence;

/// What settling one vote does to its caster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDelta {
    /// Trust-score change in internal [0, 1] units (display points / 100).
    pub trust_delta: f64,
    /// XP change for the gamification balance.
    pub xp_delta: i64,
}

/// Compute the trust and XP deltas for one settled vote.
pub fn settlement_delta(confidence: Confidence, is_correct: bool) -> ScoreDelta {
    let c = confidence.percent();
    if is_correct {
        ScoreDelta {
            trust_delta: 2.0 * (c / 50.0) / 100.0,
            xp_delta: (10.0 * (c / 10.0)).round() as i64,
        }
    } else {
        ScoreDelta {
            trust_delta: -3.5 * (c / 50.0) / 100.0,
            xp_delta: -((5.0 * (c / 10.0) * 1.5).round() as i64),
        }
    }
}

/// Apply a delta to a trust score, clamping the result to [0, 1].
pub fn apply_trust_delta(score: f64, delta: f64) -> f64 {
    (score + delta).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_high_confidence_correct() {
        let delta = settlement_delta(Confidence::High, true);
        // +2.0 x (99/50) = +3.96 points
        assert!(close(delta.trust_delta, 0.0396));
        assert_eq!(delta.xp_delta, 99);
    }

    #[test]
    fn test_high_confidence_incorrect() {
        let delta = settlement_delta(Confidence::High, false);
        // -3.5 x (99/50) = -6.93 points
        assert!(close(delta.trust_delta, -0.0693));
        assert_eq!(delta.xp_delta, -74);
    }

    #[test]
    fn test_medium_confidence() {
        let correct = settlement_delta(Confidence::Medium, true);
        assert!(close(correct.trust_delta, 0.03));
        assert_eq!(correct.xp_delta, 75);

        let wrong = settlement_delta(Confidence::Medium, false);
        assert!(close(wrong.trust_delta, -0.0525));
        assert_eq!(wrong.xp_delta, -56);
    }

    #[test]
    fn test_low_confidence() {
        let correct = settlement_delta(Confidence::Low, true);
        assert!(close(correct.trust_delta, 0.02));
        assert_eq!(correct.xp_delta, 50);

        let wrong = settlement_delta(Confidence::Low, false);
        assert!(close(wrong.trust_delta, -0.035));
        assert_eq!(wrong.xp_delta, -38);
    }

    #[test]
    fn test_penalty_exceeds_reward_at_every_confidence() {
        for confidence in [Confidence::Low, Confidence::Medium, Confidence::High] {
            let reward = settlement_delta(confidence, true);
            let penalty = settlement_delta(confidence, false);
            assert!(
                penalty.trust_delta.abs() > reward.trust_delta.abs(),
                "penalty must outweigh reward for {confidence:?}"
            );
        }
    }

    #[test]
    fn test_clamping() {
        assert_eq!(apply_trust_delta(0.99, 0.0396), 1.0);
        assert_eq!(apply_trust_delta(0.02, -0.0693), 0.0);
        assert!(close(apply_trust_delta(0.70, 0.0396), 0.7396));
    }
}
