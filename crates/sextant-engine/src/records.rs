//! Record-mode extraction: one JSON object per non-blank line, each parsed in
//! isolation. A line that fails to decode, or decodes to an unrecognized or
//! invariant-violating record, is skipped without aborting the rest.

use serde::Deserialize;
use tracing::debug;

use sextant_core::{
    Complexity, DecisionPoint, ErrorRecovery, OrchestrationSignals, NOT_SPECIFIED,
};

/// One line of a record stream. The `type` discriminator selects the payload.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SessionRecord {
    Skill {
        #[serde(default)]
        name: String,
    },
    Agent {
        #[serde(default)]
        name: String,
    },
    Decision {
        #[serde(default)]
        description: String,
        #[serde(default)]
        tradeoffs: Vec<String>,
        #[serde(default, rename = "chosenPath")]
        chosen_path: Option<String>,
    },
    Error {
        #[serde(default)]
        error: String,
        #[serde(default)]
        recovery: Option<String>,
    },
    Learning {
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        learning: Option<String>,
    },
}

/// Extract signals from a line-delimited record stream. No deduplication:
/// every valid record contributes exactly one entry.
pub fn extract_records(content: &str) -> OrchestrationSignals {
    let mut signals = OrchestrationSignals::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SessionRecord>(line) {
            Ok(record) => apply_record(record, &mut signals, index),
            Err(e) => {
                debug!(line = index + 1, error = %e, "skipping undecodable record line");
            }
        }
    }

    signals.metadata.complexity = Complexity::from_signal_total(
        signals.skills_invoked.len()
            + signals.agents_spawned.len()
            + signals.decision_points.len(),
    );
    signals
}

fn apply_record(record: SessionRecord, signals: &mut OrchestrationSignals, index: usize) {
    match record {
        SessionRecord::Skill { name } => {
            if let Some(token) = valid_token(&name) {
                signals.skills_invoked.push(token);
            } else {
                debug!(line = index + 1, "skipping skill record with invalid name");
            }
        }
        SessionRecord::Agent { name } => {
            if let Some(token) = valid_token(&name) {
                signals.agents_spawned.push(token);
            } else {
                debug!(line = index + 1, "skipping agent record with invalid name");
            }
        }
        SessionRecord::Decision {
            description,
            tradeoffs,
            chosen_path,
        } => {
            let description = description.trim().to_string();
            if description.is_empty() {
                debug!(line = index + 1, "skipping decision record without a description");
                return;
            }
            signals.decision_points.push(
                DecisionPoint::new(description)
                    .with_tradeoffs(tradeoffs)
                    .with_chosen_path(or_not_specified(chosen_path)),
            );
        }
        SessionRecord::Error { error, recovery } => {
            let error = error.trim().to_string();
            if error.is_empty() {
                debug!(line = index + 1, "skipping error record without error text");
                return;
            }
            signals
                .errors_recovered
                .push(ErrorRecovery::new(error).with_recovery(or_not_specified(recovery)));
        }
        SessionRecord::Learning { pattern, learning } => {
            let statement = pattern
                .filter(|p| !p.trim().is_empty())
                .or_else(|| learning.filter(|l| !l.trim().is_empty()));
            match statement {
                Some(s) => signals.compound_learnings.push(s.trim().to_string()),
                None => debug!(line = index + 1, "skipping learning record without a statement"),
            }
        }
    }
}

/// Lowercase a record token and reject empty or path-like names, keeping the
/// token invariants without failing the stream.
fn valid_token(name: &str) -> Option<String> {
    let token = name.trim().to_lowercase();
    if token.is_empty() || token.contains('/') || token.contains('\\') {
        return None;
    }
    Some(token)
}

fn or_not_specified(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_record_type() {
        let stream = concat!(
            "{\"type\":\"skill\",\"name\":\"deploy\"}\n",
            "{\"type\":\"agent\",\"name\":\"explorer\"}\n",
            "{\"type\":\"decision\",\"description\":\"use caching\",\"tradeoffs\":[\"cost\"],\"chosenPath\":\"redis\"}\n",
            "{\"type\":\"error\",\"error\":\"timeout\",\"recovery\":\"retried\"}\n",
            "{\"type\":\"learning\",\"pattern\":\"batch writes\"}\n",
        );
        let signals = extract_records(stream);
        assert_eq!(signals.skills_invoked, vec!["deploy"]);
        assert_eq!(signals.agents_spawned, vec!["explorer"]);
        assert_eq!(signals.decision_points.len(), 1);
        assert_eq!(signals.decision_points[0].chosen_path, "redis");
        assert_eq!(signals.errors_recovered.len(), 1);
        assert_eq!(signals.compound_learnings, vec!["batch writes"]);
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let stream = "{\"type\":\"skill\",\"name\":\"deploy\"}\nnot json at all\n{\"type\":\"skill\",\"name\":\"review\"}\n";
        let signals = extract_records(stream);
        assert_eq!(signals.skills_invoked, vec!["deploy", "review"]);
    }

    #[test]
    fn malformed_line_equivalent_to_removed_line() {
        let with_bad = "{\"type\":\"skill\",\"name\":\"a\"}\n{broken\n{\"type\":\"agent\",\"name\":\"b\"}\n";
        let without = "{\"type\":\"skill\",\"name\":\"a\"}\n{\"type\":\"agent\",\"name\":\"b\"}\n";
        assert_eq!(extract_records(with_bad), extract_records(without));
    }

    #[test]
    fn unknown_type_is_skipped() {
        let stream = "{\"type\":\"telemetry\",\"name\":\"x\"}\n{\"type\":\"skill\",\"name\":\"deploy\"}\n";
        assert_eq!(extract_records(stream).skills_invoked, vec!["deploy"]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let stream = "\n{\"type\":\"skill\",\"name\":\"deploy\"}\n   \n";
        assert_eq!(extract_records(stream).skills_invoked, vec!["deploy"]);
    }

    #[test]
    fn no_deduplication_in_record_mode() {
        let stream = "{\"type\":\"skill\",\"name\":\"deploy\"}\n{\"type\":\"skill\",\"name\":\"deploy\"}\n";
        assert_eq!(extract_records(stream).skills_invoked.len(), 2);
    }

    #[test]
    fn decision_defaults_match_prose_mode() {
        let stream = "{\"type\":\"decision\",\"description\":\"pick one\"}\n";
        let signals = extract_records(stream);
        assert_eq!(signals.decision_points[0].chosen_path, NOT_SPECIFIED);
        assert!(signals.decision_points[0].tradeoffs.is_empty());
    }

    #[test]
    fn empty_required_fields_skip_the_record() {
        let stream = concat!(
            "{\"type\":\"skill\",\"name\":\"\"}\n",
            "{\"type\":\"decision\",\"description\":\"\"}\n",
            "{\"type\":\"error\",\"error\":\"  \"}\n",
            "{\"type\":\"learning\"}\n",
        );
        let signals = extract_records(stream);
        assert!(signals.skills_invoked.is_empty());
        assert!(signals.decision_points.is_empty());
        assert!(signals.errors_recovered.is_empty());
        assert!(signals.compound_learnings.is_empty());
    }

    #[test]
    fn learning_falls_back_to_learning_field() {
        let stream = "{\"type\":\"learning\",\"learning\":\"verify before merge\"}\n";
        assert_eq!(
            extract_records(stream).compound_learnings,
            vec!["verify before merge"]
        );
    }

    #[test]
    fn record_tokens_are_lowercased() {
        let stream = "{\"type\":\"agent\",\"name\":\"Explorer\"}\n";
        assert_eq!(extract_records(stream).agents_spawned, vec!["explorer"]);
    }

    #[test]
    fn complexity_derived_from_record_counts() {
        let mut stream = String::new();
        for i in 0..6 {
            stream.push_str(&format!("{{\"type\":\"skill\",\"name\":\"skill-{i}\"}}\n"));
        }
        let signals = extract_records(&stream);
        assert_eq!(signals.metadata.complexity, Complexity::Moderate);
    }
}
