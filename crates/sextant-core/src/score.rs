use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;

/// Schema version tag carried on every score result.
pub const SCORE_VERSION: &str = "1.0";

/// The five sub-metrics, each in [0, 100].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringMetrics {
    pub skill_diversity: f64,
    pub decision_depth: f64,
    pub error_recovery_rate: f64,
    pub compound_learning_signals: f64,
    pub orchestration_mastery: f64,
}

impl ScoringMetrics {
    /// All five values as (label, value) pairs, in weight order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("skillDiversity", self.skill_diversity),
            ("decisionDepth", self.decision_depth),
            ("errorRecoveryRate", self.error_recovery_rate),
            ("compoundLearningSignals", self.compound_learning_signals),
            ("orchestrationMastery", self.orchestration_mastery),
        ]
    }
}

/// Per-metric weights. Expected (not enforced) to sum to 1.0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub skill_diversity: f64,
    pub decision_depth: f64,
    pub error_recovery_rate: f64,
    pub compound_learning_signals: f64,
    pub orchestration_mastery: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_diversity: 0.20,
            decision_depth: 0.25,
            error_recovery_rate: 0.20,
            compound_learning_signals: 0.20,
            orchestration_mastery: 0.15,
        }
    }
}

impl ScoringWeights {
    /// Weighted sum of a metric breakdown.
    pub fn apply(&self, metrics: &ScoringMetrics) -> f64 {
        metrics.skill_diversity * self.skill_diversity
            + metrics.decision_depth * self.decision_depth
            + metrics.error_recovery_rate * self.error_recovery_rate
            + metrics.compound_learning_signals * self.compound_learning_signals
            + metrics.orchestration_mastery * self.orchestration_mastery
    }
}

/// The final score for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScore {
    pub session_id: SessionId,
    pub overall_score: f64,
    pub breakdown: ScoringMetrics,
    pub weights: ScoringWeights,
    pub version: String,
    pub scored_at: DateTime<Utc>,
}

/// Quality tier assigned by fixed thresholds on the overall score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Poor,
    Fair,
    Good,
    Excellent,
    Exceptional,
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poor => write!(f, "poor"),
            Self::Fair => write!(f, "fair"),
            Self::Good => write!(f, "good"),
            Self::Excellent => write!(f, "excellent"),
            Self::Exceptional => write!(f, "exceptional"),
        }
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poor" => Ok(Self::Poor),
            "fair" => Ok(Self::Fair),
            "good" => Ok(Self::Good),
            "excellent" => Ok(Self::Excellent),
            "exceptional" => Ok(Self::Exceptional),
            other => Err(format!("unknown quality tier: {other}")),
        }
    }
}

/// Expected score band for a complexity tier. Reporting only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min: f64,
    pub target: f64,
    pub excellent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_published_split() {
        let w = ScoringWeights::default();
        assert_eq!(w.skill_diversity, 0.20);
        assert_eq!(w.decision_depth, 0.25);
        assert_eq!(w.error_recovery_rate, 0.20);
        assert_eq!(w.compound_learning_signals, 0.20);
        assert_eq!(w.orchestration_mastery, 0.15);
        let sum = w.skill_diversity
            + w.decision_depth
            + w.error_recovery_rate
            + w.compound_learning_signals
            + w.orchestration_mastery;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_sum_of_known_breakdown() {
        let metrics = ScoringMetrics {
            skill_diversity: 20.0,
            decision_depth: 40.0,
            error_recovery_rate: 60.0,
            compound_learning_signals: 80.0,
            orchestration_mastery: 100.0,
        };
        let overall = ScoringWeights::default().apply(&metrics);
        assert!((overall - 57.0).abs() < 1e-9);
    }

    #[test]
    fn session_score_serializes_camel_case() {
        let score = SessionScore {
            session_id: SessionId::from_raw("sess_fixed"),
            overall_score: 57.0,
            breakdown: ScoringMetrics::default(),
            weights: ScoringWeights::default(),
            version: SCORE_VERSION.to_string(),
            scored_at: Utc::now(),
        };
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["sessionId"], "sess_fixed");
        assert_eq!(json["overallScore"], 57.0);
        assert!(json["breakdown"].get("skillDiversity").is_some());
        assert!(json["weights"].get("orchestrationMastery").is_some());
        assert_eq!(json["version"], "1.0");
        assert!(json.get("scoredAt").is_some());
    }

    #[test]
    fn tier_round_trips_through_str() {
        for tier in [
            QualityTier::Poor,
            QualityTier::Fair,
            QualityTier::Good,
            QualityTier::Excellent,
            QualityTier::Exceptional,
        ] {
            let parsed: QualityTier = tier.to_string().parse().unwrap();
            assert_eq!(parsed, tier);
        }
    }

    #[test]
    fn metric_entries_in_weight_order() {
        let metrics = ScoringMetrics {
            skill_diversity: 1.0,
            decision_depth: 2.0,
            error_recovery_rate: 3.0,
            compound_learning_signals: 4.0,
            orchestration_mastery: 5.0,
        };
        let labels: Vec<&str> = metrics.entries().iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                "skillDiversity",
                "decisionDepth",
                "errorRecoveryRate",
                "compoundLearningSignals",
                "orchestrationMastery"
            ]
        );
    }
}
