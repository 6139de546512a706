//! Prose-mode extraction: five independent category extractors layering
//! multiple heuristics over the same text. Skills, agents and learnings merge
//! by union; decisions and errors concatenate across their structural forms.

use sextant_core::{
    Complexity, DecisionPoint, ErrorRecovery, OrchestrationSignals, SessionMetadata, NOT_SPECIFIED,
};

use crate::patterns::{
    self, agent_rules, is_valid_skill_token, learning_rules, section, skill_rules,
};

/// Run all five category extractors plus metadata over a prose transcript.
/// Never fails: signal-free text yields empty collections.
pub fn extract_prose(content: &str) -> OrchestrationSignals {
    let mut signals = OrchestrationSignals::new();

    for token in extract_skills(content) {
        signals.add_skill(token);
    }
    for token in extract_agents(content) {
        signals.add_agent(token);
    }
    signals.decision_points = extract_decisions(content);
    signals.errors_recovered = extract_errors(content);
    for statement in extract_learnings(content) {
        signals.add_learning(statement);
    }

    // Complexity derivation reuses the counts computed above; it must never
    // disagree with what the same document reports when metadata is explicit.
    signals.metadata = extract_metadata(
        content,
        signals.skills_invoked.len()
            + signals.agents_spawned.len()
            + signals.decision_points.len(),
    );

    signals
}

/// Harvest skill tokens from every inline rule plus the "Skills Invoked"
/// section, lowercased, deduplicated, validity-filtered.
pub fn extract_skills(content: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    for rule in skill_rules() {
        for caps in rule.pattern.captures_iter(content) {
            push_unique_lower(&mut tokens, &caps[1]);
        }
    }

    if let Some(body) = section(
        content,
        &patterns::SKILLS_SECTION_HEADING,
        &patterns::SKILLS_SECTION_END,
    ) {
        for caps in patterns::SKILLS_SECTION_ITEM.captures_iter(body) {
            let token = caps[1].to_lowercase();
            if token != "skills" && token != "invoked" {
                push_unique_lower(&mut tokens, &token);
            }
        }
    }

    tokens.retain(|t| is_valid_skill_token(t));
    tokens
}

/// Harvest agent tokens from invocation traces, callouts, spawning phrases and
/// the "Agents Spawned/Activity" section.
pub fn extract_agents(content: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    for rule in agent_rules() {
        for caps in rule.pattern.captures_iter(content) {
            push_unique_lower(&mut tokens, &caps[1]);
        }
    }

    if let Some(body) = section(
        content,
        &patterns::AGENTS_SECTION_HEADING,
        &patterns::AGENTS_SECTION_END,
    ) {
        for caps in patterns::AGENTS_NUMBERED_ITEM.captures_iter(body) {
            push_unique_lower(&mut tokens, &caps[1]);
        }
        for caps in patterns::AGENTS_ANNOTATED_BULLET.captures_iter(body) {
            let token = caps[1].to_lowercase();
            if token != "agents" && token != "spawned" {
                push_unique_lower(&mut tokens, &token);
            }
        }
        for caps in patterns::AGENTS_PLAIN_BULLET.captures_iter(body) {
            let token = caps[1].to_lowercase();
            if token != "agents" && token != "spawned" && token != "no" {
                push_unique_lower(&mut tokens, &token);
            }
        }
    }

    tokens
}

/// Extract decision points from the three structural forms, concatenated.
/// A decision authored in both the `####` bold form and a `###` block form is
/// counted twice; the splitter overlap is deliberate (see DESIGN.md).
pub fn extract_decisions(content: &str) -> Vec<DecisionPoint> {
    let mut decisions = Vec::new();

    // Form (a): inline Decision / Tradeoffs / Chosen Path paragraphs.
    for paragraph in content.split("\n\n") {
        let Some(caps) = patterns::DECISION_INLINE.captures(paragraph) else {
            continue;
        };
        let description = caps[1].trim().to_string();
        if description.is_empty() {
            continue;
        }
        let tradeoffs = caps
            .get(2)
            .map(|m| split_inline_tradeoffs(m.as_str()))
            .unwrap_or_default();
        let chosen_path = non_empty_or_default(caps.get(3).map(|m| m.as_str()));
        decisions.push(
            DecisionPoint::new(description)
                .with_tradeoffs(tradeoffs)
                .with_chosen_path(chosen_path),
        );
    }

    // Form (b): #### Decision N: headings with bold-labeled fields.
    for caps in patterns::DECISION_BOLD_BLOCK.captures_iter(content) {
        let description = caps[2].trim().to_string();
        if description.is_empty() {
            continue;
        }
        let tradeoffs: Vec<String> = caps[3]
            .trim()
            .lines()
            .map(strip_bullet)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        let chosen_path = non_empty_or_default(Some(&caps[4]));
        decisions.push(
            DecisionPoint::new(description)
                .with_tradeoffs(tradeoffs)
                .with_chosen_path(chosen_path),
        );
    }

    // Form (c): ### Decision N: blocks with labeled fields.
    for block in patterns::DECISION_BLOCK_SPLIT.split(content).skip(1) {
        let title = first_line(block);
        let Some(description) = patterns::DECISION_DESCRIPTION_FIELD
            .captures(block)
            .map(|c| c[1].trim().to_string())
            .filter(|d| !d.is_empty())
        else {
            continue;
        };

        let tradeoffs = patterns::DECISION_TRADEOFFS_FIELD
            .captures(block)
            .map(|c| {
                c[1].lines()
                    .map(strip_bullet)
                    .filter(|l| !l.is_empty() && !patterns::DECISION_FIELD_ECHO.is_match(l))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let chosen_path = patterns::DECISION_CHOSEN_FIELD
            .captures(block)
            .map(|c| c[1].trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string());

        let description = if title.is_empty() {
            description
        } else {
            format!("{title}: {description}")
        };
        decisions.push(
            DecisionPoint::new(description)
                .with_tradeoffs(tradeoffs)
                .with_chosen_path(chosen_path),
        );
    }

    decisions
}

/// Extract error/recovery pairs. `### Error N:` blocks win when present;
/// otherwise the inline `Error: ... Recovery: ...` pattern is applied across
/// the document.
pub fn extract_errors(content: &str) -> Vec<ErrorRecovery> {
    let blocks: Vec<&str> = patterns::ERROR_BLOCK_SPLIT.split(content).collect();

    if blocks.len() > 1 {
        let mut errors = Vec::new();
        for block in &blocks[1..] {
            let title = first_line(block);
            let Some(error_text) = patterns::ERROR_FIELD
                .captures(block)
                .map(|c| c[1].trim().to_string())
                .filter(|e| !e.is_empty())
            else {
                continue;
            };
            let recovery = patterns::RECOVERY_FIELD
                .captures(block)
                .map(|c| c[1].trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| NOT_SPECIFIED.to_string());
            let error_text = if title.is_empty() {
                error_text
            } else {
                format!("{title}: {error_text}")
            };
            errors.push(ErrorRecovery::new(error_text).with_recovery(recovery));
        }
        return errors;
    }

    let mut errors = Vec::new();
    for paragraph in content.split("\n\n") {
        let starts: Vec<usize> = patterns::ERROR_INLINE_START
            .find_iter(paragraph)
            .map(|m| m.start())
            .collect();
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(paragraph.len());
            let Some(caps) = patterns::ERROR_INLINE.captures(&paragraph[start..end]) else {
                continue;
            };
            let error_text = caps[1].trim().to_string();
            if error_text.is_empty() {
                continue;
            }
            let recovery = non_empty_or_default(caps.get(2).map(|m| m.as_str()));
            errors.push(ErrorRecovery::new(error_text).with_recovery(recovery));
        }
    }
    errors
}

/// Harvest compound-learning statements from inline rules, the "Compound
/// Learnings" section, and `### Learning N:` headings.
pub fn extract_learnings(content: &str) -> Vec<String> {
    let mut learnings: Vec<String> = Vec::new();

    for rule in learning_rules() {
        for caps in rule.pattern.captures_iter(content) {
            push_unique(&mut learnings, caps[1].trim());
        }
    }

    if let Some(body) = section(
        content,
        &patterns::LEARNINGS_SECTION_HEADING,
        &patterns::LEARNINGS_SECTION_END,
    ) {
        for caps in patterns::LEARNINGS_SECTION_ITEM.captures_iter(body) {
            push_unique(&mut learnings, caps[1].trim());
        }
    }

    for block in patterns::LEARNING_BLOCK_SPLIT.split(content).skip(1) {
        let (title_line, rest) = block.split_once('\n').unwrap_or((block, ""));
        let title = title_line.trim();
        if title.is_empty() {
            continue;
        }
        let body = match patterns::HEADING_BOUNDARY.find(rest) {
            Some(m) => &rest[..m.start()],
            None => rest,
        };
        let first_paragraph = body.split("\n\n").next().unwrap_or("").trim();
        let statement = if first_paragraph.is_empty() {
            title.to_string()
        } else {
            format!("{title}: {first_paragraph}")
        };
        push_unique(&mut learnings, &statement);
    }

    learnings
}

/// Read duration / project type / complexity fields. An absent complexity is
/// derived from the combined skill + agent + decision count.
pub fn extract_metadata(content: &str, signal_total: usize) -> SessionMetadata {
    let mut metadata = SessionMetadata::default();

    if let Some(caps) = patterns::DURATION_FIELD.captures(content) {
        metadata.duration_minutes = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok());
    }

    if let Some(caps) = patterns::PROJECT_TYPE_FIELD.captures(content) {
        metadata.project_type = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim().to_string());
    }

    metadata.complexity = patterns::COMPLEXITY_FIELD
        .captures(content)
        .and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().to_lowercase().parse().ok())
        })
        .unwrap_or_else(|| Complexity::from_signal_total(signal_total));

    metadata
}

fn push_unique_lower(tokens: &mut Vec<String>, raw: &str) {
    let token = raw.to_lowercase();
    if !token.is_empty() && !tokens.iter().any(|t| t == &token) {
        tokens.push(token);
    }
}

fn push_unique(values: &mut Vec<String>, raw: &str) {
    if !raw.is_empty() && !values.iter().any(|v| v == raw) {
        values.push(raw.to_string());
    }
}

fn split_inline_tradeoffs(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim_start();
    let line = line.strip_prefix(['-', '*']).unwrap_or(line);
    line.trim()
}

fn non_empty_or_default(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_SPECIFIED)
        .to_string()
}

/// First non-blank line of a block, trimmed.
fn first_line(block: &str) -> &str {
    block.trim_start().lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_from_slash_mentions() {
        let skills = extract_skills("ran /code-review then /deploy-check on the branch");
        assert_eq!(skills, vec!["code-review", "deploy-check"]);
    }

    #[test]
    fn skills_reject_stop_list_tokens() {
        let skills = extract_skills("cd /src then /config and /tests and /dist");
        assert!(skills.is_empty(), "got: {skills:?}");
    }

    #[test]
    fn skills_from_directive_and_callout() {
        let text = "Skill: commit-helper\n🔧 Skill Activation: `test-runner`";
        let skills = extract_skills(text);
        assert_eq!(skills, vec!["commit-helper", "test-runner"]);
    }

    #[test]
    fn skills_from_invocation_trace() {
        let text = "<invoke name=\"Skill\">\n<parameter name=\"skill\">release-notes</parameter>\n</invoke>";
        assert_eq!(extract_skills(text), vec!["release-notes"]);
    }

    #[test]
    fn skills_from_section_excluding_echo_words() {
        let text = "### 🔧 Skills Invoked\n- deploy\n- skills\n- invoked\n- review\n### Next";
        assert_eq!(extract_skills(text), vec!["deploy", "review"]);
    }

    #[test]
    fn skills_lowercased_and_deduped() {
        let skills = extract_skills("used /Deploy and later /deploy again");
        assert_eq!(skills, vec!["deploy"]);
    }

    #[test]
    fn agents_from_task_trace_and_callout() {
        let text = "<invoke name=\"Task\">\n<parameter name=\"subagent_type\">explorer</parameter>\n🤖 Agent spawned: `reviewer`";
        assert_eq!(extract_agents(text), vec!["explorer", "reviewer"]);
    }

    #[test]
    fn agents_from_spawning_phrase() {
        assert_eq!(
            extract_agents("then spawning the researcher agent for docs"),
            vec!["researcher"]
        );
    }

    #[test]
    fn agents_from_numbered_section() {
        let text = "### Agents Spawned\n1. explorer\n2. reviewer\n## Next";
        assert_eq!(extract_agents(text), vec!["explorer", "reviewer"]);
    }

    #[test]
    fn agents_from_bulleted_section_excluding_echo_words() {
        let text = "### Agent Activity\n- explorer (read the tree)\n- no\n- spawned\n- builder\n## End";
        let agents = extract_agents(text);
        assert!(agents.contains(&"explorer".to_string()));
        assert!(agents.contains(&"builder".to_string()));
        assert!(!agents.contains(&"no".to_string()));
        assert!(!agents.contains(&"spawned".to_string()));
    }

    #[test]
    fn inline_decision_full_form() {
        let text = "Decision: Use caching\nTradeoffs: complexity, cost\nChosen Path: Redis";
        let decisions = extract_decisions(text);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].description, "Use caching");
        assert_eq!(decisions[0].tradeoffs, vec!["complexity", "cost"]);
        assert_eq!(decisions[0].chosen_path, "Redis");
    }

    #[test]
    fn inline_decision_defaults() {
        let decisions = extract_decisions("Decision: Ship it");
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].description, "Ship it");
        assert!(decisions[0].tradeoffs.is_empty());
        assert_eq!(decisions[0].chosen_path, NOT_SPECIFIED);
    }

    #[test]
    fn inline_decision_point_variant_with_prefix() {
        let decisions = extract_decisions("📋 Decision Point: split the crate\nChosen: workspace");
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].description, "split the crate");
        assert_eq!(decisions[0].chosen_path, "workspace");
    }

    #[test]
    fn one_inline_decision_per_paragraph() {
        let text = "Decision: first\nChosen: a\n\nDecision: second\nChosen: b";
        let decisions = extract_decisions(text);
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].description, "first");
        assert_eq!(decisions[1].description, "second");
    }

    #[test]
    fn bold_block_decision() {
        let text = "#### Decision 1: Caching layer\n- **Description**: Pick a cache\n- **Tradeoffs**:\n  - memory cost\n  - invalidation\n- **Chosen Path**: Redis\n";
        let decisions = extract_decisions(text);
        // Once from the bold form, once from the block form (the splitter
        // overlap is preserved behavior).
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].description, "Pick a cache");
        assert_eq!(decisions[0].tradeoffs, vec!["memory cost", "invalidation"]);
        assert_eq!(decisions[0].chosen_path, "Redis");
    }

    #[test]
    fn block_decision_with_tradeoffs_considered() {
        let text = "### Decision 1: Storage\nDescription: pick a database\nTradeoffs Considered:\n- sqlite is simple\n- postgres scales\nChosen Path: sqlite\n";
        let decisions = extract_decisions(text);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].description, "Storage: pick a database");
        assert_eq!(
            decisions[0].tradeoffs,
            vec!["sqlite is simple", "postgres scales"]
        );
        assert_eq!(decisions[0].chosen_path, "sqlite");
    }

    #[test]
    fn block_decision_filters_field_label_lines() {
        let text = "### Decision 1: Storage\nDescription: pick one\nTradeoffs Considered:\n- option a\n- Description: stray label\nChosen Path: a\n";
        let decisions = extract_decisions(text);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].tradeoffs, vec!["option a"]);
    }

    #[test]
    fn block_decision_requires_description() {
        let decisions = extract_decisions("### Decision 1: Title only\nno labeled fields here\n");
        assert!(decisions.is_empty());
    }

    #[test]
    fn duplicate_decision_across_forms() {
        // A #### block satisfying form (b) is also consumed by the form (c)
        // splitter: the same decision scores twice. Suspect but preserved.
        let text = "#### Decision 1: Caching\n- **Description**: Pick a cache\n- **Tradeoffs**:\n  - cost\n- **Chosen Path**: Redis\n";
        assert_eq!(extract_decisions(text).len(), 2);
    }

    #[test]
    fn error_blocks_with_titles() {
        let text = "### Error 1: DB timeout\nError: connection refused\nRecovery: retried with backoff\n\n### Error 2: OOM\nError: worker killed\n";
        let errors = extract_errors(text);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error, "DB timeout: connection refused");
        assert_eq!(errors[0].recovery, "retried with backoff");
        assert_eq!(errors[1].error, "OOM: worker killed");
        assert_eq!(errors[1].recovery, NOT_SPECIFIED);
    }

    #[test]
    fn inline_errors_when_no_blocks() {
        let text = "Error: build failed\nRecovery: pinned the toolchain\n\nError: flaky test";
        let errors = extract_errors(text);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error, "build failed");
        assert_eq!(errors[0].recovery, "pinned the toolchain");
        assert_eq!(errors[1].error, "flaky test");
        assert_eq!(errors[1].recovery, NOT_SPECIFIED);
    }

    #[test]
    fn adjacent_inline_errors_in_one_paragraph() {
        let text = "⚠️ Error: first failure\nError: second failure\nRecovery: fixed";
        let errors = extract_errors(text);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error, "first failure");
        assert_eq!(errors[1].error, "second failure");
        assert_eq!(errors[1].recovery, "fixed");
    }

    #[test]
    fn learnings_from_inline_statements() {
        let text = "Pattern learned: batch the writes\nKey insight: tests first\n🔄 Compound Learning: cache the parse";
        let learnings = extract_learnings(text);
        assert_eq!(
            learnings,
            vec!["batch the writes", "cache the parse", "tests first"]
        );
    }

    #[test]
    fn learnings_from_section() {
        let text = "### 🔄 Compound Learnings\n1. **Pattern**: split work by file\n2. **Pattern**: verify before merge\n### Next";
        let learnings = extract_learnings(text);
        assert_eq!(
            learnings,
            vec!["split work by file", "verify before merge"]
        );
    }

    #[test]
    fn learnings_from_headings_with_body() {
        let text = "### Learning 1: Parallel agents\nDisjoint file sets avoid merge conflicts.\n\nMore detail here.\n\n### Learning 2: Title only\n";
        let learnings = extract_learnings(text);
        assert_eq!(learnings.len(), 2);
        assert_eq!(
            learnings[0],
            "Parallel agents: Disjoint file sets avoid merge conflicts."
        );
        assert_eq!(learnings[1], "Title only");
    }

    #[test]
    fn learnings_deduplicate() {
        let text = "Pattern learned: reuse fixtures\nKey insight: reuse fixtures";
        assert_eq!(extract_learnings(text), vec!["reuse fixtures"]);
    }

    #[test]
    fn metadata_explicit_fields() {
        let text = "**Duration**: 90 minutes\n**Project Type**: web service\n**Complexity**: complex";
        let metadata = extract_metadata(text, 0);
        assert_eq!(metadata.duration_minutes, Some(90));
        assert_eq!(metadata.project_type.as_deref(), Some("web service"));
        assert_eq!(metadata.complexity, Complexity::Complex);
    }

    #[test]
    fn metadata_plain_labels() {
        let text = "Duration: 15 mins\nProject: cli tool\nComplexity: simple";
        let metadata = extract_metadata(text, 10);
        assert_eq!(metadata.duration_minutes, Some(15));
        assert_eq!(metadata.project_type.as_deref(), Some("cli tool"));
        assert_eq!(metadata.complexity, Complexity::Simple);
    }

    #[test]
    fn metadata_complexity_derived_from_counts() {
        assert_eq!(extract_metadata("", 3).complexity, Complexity::Simple);
        assert_eq!(extract_metadata("", 7).complexity, Complexity::Moderate);
        assert_eq!(extract_metadata("", 20).complexity, Complexity::Complex);
    }

    #[test]
    fn derived_complexity_consistent_with_extraction() {
        let text = "used /alpha /bravo /charlie\nspawning the delta agent\nDecision: echo\n";
        let signals = extract_prose(text);
        let total = signals.skills_invoked.len()
            + signals.agents_spawned.len()
            + signals.decision_points.len();
        assert_eq!(total, 5);
        assert_eq!(signals.metadata.complexity, Complexity::Moderate);
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "used /deploy\n🤖 Agent spawned: `explorer`\nDecision: go\nError: oops\nPattern learned: check twice\n";
        let first = extract_prose(text);
        let second = extract_prose(text);
        assert_eq!(first, second);
    }

    #[test]
    fn signal_free_text_yields_empty_signals() {
        let signals = extract_prose("Just an ordinary note about nothing in particular.");
        assert!(signals.skills_invoked.is_empty());
        assert!(signals.agents_spawned.is_empty());
        assert!(signals.decision_points.is_empty());
        assert!(signals.errors_recovered.is_empty());
        assert!(signals.compound_learnings.is_empty());
        assert_eq!(signals.metadata.complexity, Complexity::Simple);
    }
}
