//! Quality classification: a fixed threshold ladder on the overall score,
//! plus the expected score band per complexity tier (reporting only).

use sextant_core::{Complexity, QualityTier, ScoreBand};

/// A tier with its fixed human-readable description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityAssessment {
    pub tier: QualityTier,
    pub description: &'static str,
}

/// Classify an overall score into a quality tier.
pub fn classify_quality(score: f64) -> QualityAssessment {
    if score >= 90.0 {
        QualityAssessment {
            tier: QualityTier::Exceptional,
            description: "Top 5%: production-ready orchestration mastery",
        }
    } else if score >= 80.0 {
        QualityAssessment {
            tier: QualityTier::Excellent,
            description: "Top 20%: strong orchestration patterns",
        }
    } else if score >= 70.0 {
        QualityAssessment {
            tier: QualityTier::Good,
            description: "Above average: solid execution",
        }
    } else if score >= 60.0 {
        QualityAssessment {
            tier: QualityTier::Fair,
            description: "Functional: room for improvement",
        }
    } else {
        QualityAssessment {
            tier: QualityTier::Poor,
            description: "Below benchmark: needs significant refinement",
        }
    }
}

/// Expected score band for a complexity tier. Used for reporting and
/// comparison, never for computing the score itself.
pub fn expected_score_band(complexity: Complexity) -> ScoreBand {
    match complexity {
        Complexity::Simple => ScoreBand {
            min: 60.0,
            target: 75.0,
            excellent: 90.0,
        },
        Complexity::Moderate => ScoreBand {
            min: 70.0,
            target: 80.0,
            excellent: 92.0,
        },
        Complexity::Complex => ScoreBand {
            min: 75.0,
            target: 85.0,
            excellent: 95.0,
        },
    }
}
