//! Signal extraction and scoring for AI orchestration session transcripts.
//!
//! The pipeline: raw text -> format dispatch ([`extract`]) -> per-category
//! pattern matching ([`patterns`], [`prose`]) or record decoding ([`records`])
//! -> [`sextant_core::OrchestrationSignals`] -> weighted scoring ([`scoring`])
//! -> [`sextant_core::SessionScore`] with a quality tier ([`quality`]).

pub mod extract;
pub mod patterns;
pub mod prose;
pub mod quality;
pub mod records;
pub mod scoring;

pub use extract::{extract_signals, sanitize, SessionFormat, MAX_INPUT_BYTES};
pub use quality::{classify_quality, expected_score_band, QualityAssessment};
pub use scoring::{compute_breakdown, score_session, WeightProvider};
