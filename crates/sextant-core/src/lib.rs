//! Core data model for sextant: orchestration signals, scoring types, branded
//! ids, and the error taxonomy shared by the extraction and scoring layers.

pub mod errors;
pub mod ids;
pub mod score;
pub mod signals;

pub use errors::ScoreError;
pub use ids::{ScoreId, SessionId};
pub use score::{
    QualityTier, ScoreBand, ScoringMetrics, ScoringWeights, SessionScore, SCORE_VERSION,
};
pub use signals::{
    Complexity, DecisionPoint, ErrorRecovery, OrchestrationSignals, SessionMetadata, NOT_SPECIFIED,
};
