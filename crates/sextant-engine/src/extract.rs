//! Format dispatch and the input-size guard. This is the entry point callers
//! use: raw text + filename hint in, validated signals out.

use tracing::debug;

use sextant_core::{OrchestrationSignals, ScoreError};

use crate::{prose, records};

/// Input ceiling: a cost-control guard, not a semantic limit.
pub const MAX_INPUT_BYTES: usize = 2 * 1024 * 1024;

/// Extraction mode, selected from the filename hint. Markdown and plain text
/// share identical prose extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionFormat {
    Markdown,
    Text,
    Records,
}

impl SessionFormat {
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".jsonl") {
            Self::Records
        } else if filename.ends_with(".md") {
            Self::Markdown
        } else {
            Self::Text
        }
    }
}

/// Extract orchestration signals from raw transcript text.
///
/// Fails with `InputTooLarge` before any extraction work when the content
/// exceeds [`MAX_INPUT_BYTES`]; otherwise extraction itself never fails and
/// signal-free text yields empty collections. The result is validated against
/// the data-model invariants before being returned.
pub fn extract_signals(content: &str, filename: &str) -> Result<OrchestrationSignals, ScoreError> {
    if content.len() > MAX_INPUT_BYTES {
        return Err(ScoreError::InputTooLarge {
            limit: MAX_INPUT_BYTES,
            actual: content.len(),
        });
    }

    let format = SessionFormat::from_filename(filename);
    let signals = match format {
        SessionFormat::Records => records::extract_records(content),
        SessionFormat::Markdown | SessionFormat::Text => prose::extract_prose(content),
    };
    signals.validate()?;

    debug!(
        format = ?format,
        skills = signals.skills_invoked.len(),
        agents = signals.agents_spawned.len(),
        decisions = signals.decision_points.len(),
        errors = signals.errors_recovered.len(),
        learnings = signals.compound_learnings.len(),
        "extraction complete"
    );

    Ok(signals)
}

/// Strip C0 control characters (except tab, newline, carriage return) before
/// extraction. Callers apply this to untrusted transcript bytes.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}
