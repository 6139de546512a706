use serde::{Deserialize, Serialize};

use crate::errors::ScoreError;

/// Placeholder for an absent chosen path or recovery description.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Session complexity tier. Always resolved: when the transcript does not
/// declare one, the extractor derives it from the signal counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl Complexity {
    /// Derive a tier from the combined skill + agent + decision count.
    pub fn from_signal_total(total: usize) -> Self {
        if total < 5 {
            Self::Simple
        } else if total < 15 {
            Self::Moderate
        } else {
            Self::Complex
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Moderate => write!(f, "moderate"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "moderate" => Ok(Self::Moderate),
            "complex" => Ok(Self::Complex),
            other => Err(format!("unknown complexity: {other}")),
        }
    }
}

/// One extracted decision point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPoint {
    pub description: String,
    #[serde(default)]
    pub tradeoffs: Vec<String>,
    pub chosen_path: String,
}

impl DecisionPoint {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            tradeoffs: Vec::new(),
            chosen_path: NOT_SPECIFIED.to_string(),
        }
    }

    pub fn with_tradeoffs(mut self, tradeoffs: Vec<String>) -> Self {
        self.tradeoffs = tradeoffs;
        self
    }

    pub fn with_chosen_path(mut self, chosen_path: impl Into<String>) -> Self {
        self.chosen_path = chosen_path.into();
        self
    }

    /// True when the author named a concrete path instead of the placeholder.
    pub fn has_explicit_choice(&self) -> bool {
        !self.chosen_path.is_empty() && self.chosen_path != NOT_SPECIFIED
    }
}

/// One extracted error/recovery pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecovery {
    pub error: String,
    pub recovery: String,
}

impl ErrorRecovery {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            recovery: NOT_SPECIFIED.to_string(),
        }
    }

    pub fn with_recovery(mut self, recovery: impl Into<String>) -> Self {
        self.recovery = recovery.into();
        self
    }

    pub fn has_explicit_recovery(&self) -> bool {
        !self.recovery.is_empty() && self.recovery != NOT_SPECIFIED
    }
}

/// Session metadata read from (or derived for) a transcript.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub complexity: Complexity,
}

/// The extraction result for one transcript.
///
/// Skills, agents and learnings are deduplicated sets with insertion order
/// preserved; decisions and errors keep document order and are never deduped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationSignals {
    #[serde(default)]
    pub skills_invoked: Vec<String>,
    #[serde(default)]
    pub agents_spawned: Vec<String>,
    #[serde(default)]
    pub decision_points: Vec<DecisionPoint>,
    #[serde(default)]
    pub errors_recovered: Vec<ErrorRecovery>,
    #[serde(default)]
    pub compound_learnings: Vec<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl OrchestrationSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a skill token, keeping the set deduplicated. Returns false on a
    /// duplicate or empty token.
    pub fn add_skill(&mut self, token: impl Into<String>) -> bool {
        push_unique(&mut self.skills_invoked, token.into())
    }

    pub fn add_agent(&mut self, token: impl Into<String>) -> bool {
        push_unique(&mut self.agents_spawned, token.into())
    }

    pub fn add_learning(&mut self, statement: impl Into<String>) -> bool {
        push_unique(&mut self.compound_learnings, statement.into())
    }

    /// True when the transcript produced at least one skill, agent or
    /// decision signal. Used to skip scoring files that are not sessions.
    pub fn has_orchestration_signals(&self) -> bool {
        !self.skills_invoked.is_empty()
            || !self.agents_spawned.is_empty()
            || !self.decision_points.is_empty()
    }

    /// Enforce the data-model invariants: non-empty required text fields and
    /// well-formed tokens (lowercase, no path separators).
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (i, token) in self
            .skills_invoked
            .iter()
            .chain(self.agents_spawned.iter())
            .enumerate()
        {
            if token.is_empty() {
                return Err(ScoreError::Validation(format!("token {i} is empty")));
            }
            if token.contains('/') || token.contains('\\') {
                return Err(ScoreError::Validation(format!(
                    "token '{token}' contains a path separator"
                )));
            }
            if token.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(ScoreError::Validation(format!(
                    "token '{token}' is not lowercase"
                )));
            }
        }

        for (i, decision) in self.decision_points.iter().enumerate() {
            if decision.description.trim().is_empty() {
                return Err(ScoreError::Validation(format!(
                    "decision {i} has an empty description"
                )));
            }
        }

        for (i, entry) in self.errors_recovered.iter().enumerate() {
            if entry.error.trim().is_empty() {
                return Err(ScoreError::Validation(format!(
                    "error entry {i} has an empty error description"
                )));
            }
        }

        for (i, learning) in self.compound_learnings.iter().enumerate() {
            if learning.trim().is_empty() {
                return Err(ScoreError::Validation(format!("learning {i} is empty")));
            }
        }

        Ok(())
    }
}

fn push_unique(values: &mut Vec<String>, value: String) -> bool {
    if value.is_empty() || values.iter().any(|v| v == &value) {
        return false;
    }
    values.push(value);
    true
}
