//! Scoring engine: pure functions from extracted signals to a weighted
//! composite score. Deterministic, no hidden state, safe to call concurrently
//! with disjoint inputs. The optional weight lookup is the only async boundary.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;

use sextant_core::{
    Complexity, OrchestrationSignals, ScoringMetrics, ScoringWeights, SessionId, SessionScore,
    SCORE_VERSION,
};

/// Optional asynchronous weight lookup, consulted once per scoring call when
/// no explicit weights are supplied. Best-effort: implementations map their
/// own failures to `None`, and `None` falls back to the defaults.
#[async_trait]
pub trait WeightProvider: Send + Sync {
    async fn weights(&self) -> Option<ScoringWeights>;
}

/// Score a session. Weight precedence: explicit > provider lookup > defaults.
pub async fn score_session(
    signals: &OrchestrationSignals,
    session_id: SessionId,
    custom_weights: Option<ScoringWeights>,
    provider: Option<&dyn WeightProvider>,
) -> SessionScore {
    let weights = match custom_weights {
        Some(w) => w,
        None => match provider {
            Some(p) => p.weights().await.unwrap_or_default(),
            None => ScoringWeights::default(),
        },
    };

    let breakdown = compute_breakdown(signals);
    SessionScore {
        session_id,
        overall_score: round_one_decimal(weights.apply(&breakdown)),
        breakdown,
        weights,
        version: SCORE_VERSION.to_string(),
        scored_at: Utc::now(),
    }
}

/// Compute all five sub-metrics. Every value lies in [0, 100].
pub fn compute_breakdown(signals: &OrchestrationSignals) -> ScoringMetrics {
    ScoringMetrics {
        skill_diversity: skill_diversity(signals),
        decision_depth: decision_depth(signals),
        error_recovery_rate: error_recovery_rate(signals),
        compound_learning_signals: compound_learning_signals(signals),
        orchestration_mastery: orchestration_mastery(signals),
    }
}

/// Distinct skill count against the expectation for the complexity tier.
pub fn skill_diversity(signals: &OrchestrationSignals) -> f64 {
    let distinct: HashSet<&str> = signals.skills_invoked.iter().map(String::as_str).collect();
    let expected = expected_skills(signals.metadata.complexity);
    clamp_metric(distinct.len() as f64 / expected * 100.0)
}

/// Blend of decision quantity, tradeoff depth and chosen-path clarity.
pub fn decision_depth(signals: &OrchestrationSignals) -> f64 {
    let decisions = &signals.decision_points;
    if decisions.is_empty() {
        return 0.0;
    }

    let count = decisions.len() as f64;
    let quantity = (count / 5.0 * 100.0).min(100.0);

    let avg_tradeoffs =
        decisions.iter().map(|d| d.tradeoffs.len()).sum::<usize>() as f64 / count;
    let depth = (avg_tradeoffs / 3.0 * 100.0).min(100.0);

    let with_choice = decisions.iter().filter(|d| d.has_explicit_choice()).count() as f64;
    let clarity = with_choice / count * 100.0;

    clamp_metric(quantity * 0.3 + depth * 0.4 + clarity * 0.3)
}

/// Fraction of errors with an explicit recovery. No errors is neither
/// penalized nor rewarded: the neutral default is 70.
pub fn error_recovery_rate(signals: &OrchestrationSignals) -> f64 {
    let errors = &signals.errors_recovered;
    if errors.is_empty() {
        return 70.0;
    }
    let with_recovery = errors.iter().filter(|e| e.has_explicit_recovery()).count() as f64;
    clamp_metric(with_recovery / errors.len() as f64 * 100.0)
}

pub fn compound_learning_signals(signals: &OrchestrationSignals) -> f64 {
    let count = signals.compound_learnings.len();
    if count == 0 {
        return 0.0;
    }
    clamp_metric(count as f64 / 5.0 * 100.0)
}

/// Delegation quality. Solo work is capped low regardless of skill count;
/// with agents, quantity blends with a ratio term that peaks on balanced
/// delegation (agent-to-skill ratio in [0.3, 0.7]).
pub fn orchestration_mastery(signals: &OrchestrationSignals) -> f64 {
    let agents = signals.agents_spawned.len() as f64;
    let skills = signals.skills_invoked.len() as f64;

    if agents == 0.0 {
        return (skills / 10.0 * 20.0).min(20.0);
    }

    let quantity = (agents / 5.0 * 100.0).min(100.0);
    let ratio = agents / skills.max(1.0);
    let quality = if (0.3..=0.7).contains(&ratio) {
        100.0
    } else if ratio < 0.3 {
        ratio / 0.3 * 100.0
    } else {
        ((1.0 - (ratio - 0.7) / 0.3) * 100.0).max(0.0)
    };

    clamp_metric(quantity * 0.6 + quality * 0.4)
}

fn expected_skills(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 2.0,
        Complexity::Moderate => 5.0,
        Complexity::Complex => 10.0,
    }
}

fn clamp_metric(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
