//! Pattern registry: the recognized textual conventions per signal category.
//!
//! Each category is an ordered list of independent matcher rules evaluated over
//! the same text. Union (or concatenation, for decisions and errors) of their
//! matches gives the extraction higher recall than any single convention.

use once_cell::sync::Lazy;
use regex::Regex;

/// One heuristic within a category. The first capture group is the token or
/// statement of interest.
pub struct TokenRule {
    pub name: &'static str,
    pub pattern: Regex,
}

fn rule(name: &'static str, pattern: &str) -> TokenRule {
    TokenRule {
        name,
        pattern: compile(pattern),
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("pattern registry regex")
}

/// Inline skill-mention rules, in evaluation order.
pub fn skill_rules() -> &'static [TokenRule] {
    static RULES: Lazy<Vec<TokenRule>> = Lazy::new(|| {
        vec![
            rule("slash-mention", r"(?i)/([a-z][a-z0-9-]+)"),
            rule("skill-directive", r"(?i)Skill:\s*([a-z][a-z0-9-]+)"),
            rule(
                "skill-activation-callout",
                r"(?i)🔧\s*Skill\s+Activation:\s*`?([a-z][a-z0-9-]+)`?",
            ),
            rule(
                "skill-invocation-trace",
                r#"(?is)<invoke name="Skill">.*?<parameter name="skill">([a-z][a-z0-9-]+)"#,
            ),
        ]
    });
    &RULES
}

/// Inline agent-mention rules, in evaluation order.
pub fn agent_rules() -> &'static [TokenRule] {
    static RULES: Lazy<Vec<TokenRule>> = Lazy::new(|| {
        vec![
            rule(
                "task-invocation-trace",
                r#"(?is)<invoke name="Task">.*?<parameter name="subagent_type">([a-z][a-z0-9-]+)"#,
            ),
            rule(
                "agent-spawned-callout",
                r"(?i)🤖\s*Agent\s+spawned:\s*`?([a-z][a-z0-9-]+)`?",
            ),
            rule(
                "spawning-phrase",
                r"(?i)spawning\s+(?:the\s+)?([a-z][a-z0-9-]+)\s+agent",
            ),
        ]
    });
    &RULES
}

/// Inline learning-statement rules, in evaluation order.
pub fn learning_rules() -> &'static [TokenRule] {
    static RULES: Lazy<Vec<TokenRule>> = Lazy::new(|| {
        vec![
            rule("pattern-learned", r"(?i)Pattern\s+learned:\s*([^\n]+)"),
            rule(
                "compound-learning-callout",
                r"(?i)🔄\s*Compound\s+Learning:\s*([^\n]+)",
            ),
            rule("key-insight", r"(?i)Key\s+insight:\s*([^\n]+)"),
        ]
    });
    &RULES
}

// ── Section headings and their list-item shapes ──

pub static SKILLS_SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)###?\s*🔧?\s*Skills?\s+Invoked"));
pub static SKILLS_SECTION_END: Lazy<Regex> = Lazy::new(|| compile(r"###"));
pub static SKILLS_SECTION_ITEM: Lazy<Regex> =
    Lazy::new(|| compile(r"(?im)^[\s-]*([a-z][a-z0-9-]+)"));

pub static AGENTS_SECTION_HEADING: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)###?\s*(?:🤖\s*)?(?:Agents?\s+(?:Spawned|Activity)|Agent\s+Activity)")
});
pub static AGENTS_SECTION_END: Lazy<Regex> = Lazy::new(|| compile(r"###|##\s"));
pub static AGENTS_NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| compile(r"(?im)^\d+\.\s*([a-z][a-z0-9-]+)"));
pub static AGENTS_ANNOTATED_BULLET: Lazy<Regex> =
    Lazy::new(|| compile(r"(?im)^[\s-]+([a-z][a-z0-9-]+)\s*\("));
pub static AGENTS_PLAIN_BULLET: Lazy<Regex> =
    Lazy::new(|| compile(r"(?im)^\s*[-*]\s*([a-z][a-z0-9-]+)(?:\s|$|\()"));

pub static LEARNINGS_SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)###?\s*🔄?\s*Compound\s+Learnings"));
pub static LEARNINGS_SECTION_END: Lazy<Regex> = Lazy::new(|| compile(r"###|##\s"));
pub static LEARNINGS_SECTION_ITEM: Lazy<Regex> =
    Lazy::new(|| compile(r"(?im)^\d+\.\s*\*\*Pattern\*\*:\s*([^\n]+)"));

// ── Decision forms ──

/// Form (a): inline `Decision: ... / Tradeoffs: ... / Chosen Path: ...`
/// paragraphs. Applied per blank-line-separated block.
pub static DECISION_INLINE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?is)(?:📋\s*)?Decision(?:\s+Point)?:\s*(.+?)(?:\nTradeoffs?:\s*(.+?))?(?:\nChosen(?:\s+Path)?:\s*(.+?))?\s*\z",
    )
});

/// Form (b): `#### Decision N:` headings with bold-labeled fields, all required.
pub static DECISION_BOLD_BLOCK: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?is)####\s*Decision\s+\d+:(.+?)\n-\s*\*\*Description\*\*:\s*(.+?)\n-\s*\*\*Tradeoffs\*\*:(.*?)\n-\s*\*\*Chosen Path\*\*:\s*([^\n]+)",
    )
});

/// Form (c) splitter. Deliberately also fires on `####` headings, so a decision
/// in form (b) is extracted twice; see DESIGN.md.
pub static DECISION_BLOCK_SPLIT: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)###\s*Decision\s+\d+:"));
pub static DECISION_DESCRIPTION_FIELD: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:\*\*)?Description(?:\*\*)?:\s*([^\n]+)"));
pub static DECISION_TRADEOFFS_FIELD: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?is)(?:\*\*)?Tradeoffs?\s+Considered(?:\*\*)?:\s*\n(.*?)(?:(?:\*\*)?Chosen Path|###|##|$)",
    )
});
pub static DECISION_CHOSEN_FIELD: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:\*\*)?Chosen Path(?:\*\*)?:\s*([^\n]+)"));
/// A tradeoff bullet that is actually another field label leaking in.
pub static DECISION_FIELD_ECHO: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^(?:\*\*)?(?:Description|Tradeoffs|Chosen)"));

// ── Error forms ──

pub static ERROR_BLOCK_SPLIT: Lazy<Regex> = Lazy::new(|| compile(r"(?i)###\s*Error\s+\d+:"));
pub static ERROR_FIELD: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:\*\*)?Error(?:\*\*)?:\s*([^\n]+)"));
pub static RECOVERY_FIELD: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:\*\*)?Recovery(?:\*\*)?:\s*([^\n]+)"));
/// Start of an inline error entry; each segment runs to the next start or the
/// end of its block.
pub static ERROR_INLINE_START: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(?:⚠️\s*)?Error:"));
pub static ERROR_INLINE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?is)^(?:⚠️\s*)?Error:\s*(.+?)(?:\nRecovery:\s*(.+))?\z")
});

// ── Learning headings ──

pub static LEARNING_BLOCK_SPLIT: Lazy<Regex> = Lazy::new(|| compile(r"(?i)###\s*Learning\s+\d+:"));
/// A following heading terminates a learning body.
pub static HEADING_BOUNDARY: Lazy<Regex> = Lazy::new(|| compile(r"\n##"));

// ── Metadata fields ──

pub static DURATION_FIELD: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\*\*Duration\*\*:\s*(\d+)\s*(?:minutes?|mins?)|Duration:\s*(\d+)\s*(?:minutes?|mins?)")
});
pub static PROJECT_TYPE_FIELD: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\*\*Project\s+Type\*\*:\s*([^\n]+)|Project(?:\s+Type)?:\s*([^\n]+)")
});
pub static COMPLEXITY_FIELD: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\*\*Complexity\*\*:\s*(simple|moderate|complex)|Complexity:\s*(simple|moderate|complex)")
});

// ── Token validity ──

static FILE_EXTENSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\.(ts|tsx|js|jsx|md|json|sql|css|html|yml|yaml|txt)$"));

/// Generic structural words that show up in file-path-like text and would be
/// false-positive skill tokens.
const TOKEN_STOP_LIST: &[&str] = &[
    "src", "lib", "components", "app", "utils", "pages", "api", "node", "modules", "dist",
    "build", "public", "tests", "test", "docs", "assets", "styles", "hooks", "types", "config",
    "skills", "invoked",
];

/// Validity filter for skill tokens: no path separators, no file-extension
/// suffix, not a generic structural word. Expects a lowercased token.
pub fn is_valid_skill_token(token: &str) -> bool {
    if token.contains('/') || token.contains('\\') {
        return false;
    }
    if FILE_EXTENSION_SUFFIX.is_match(token) {
        return false;
    }
    !TOKEN_STOP_LIST.contains(&token)
}

/// Slice out a section: from the heading match through to (excluding) the
/// first terminator occurrence after it, or the end of the text. The returned
/// slice includes the heading line, matching how the item patterns are applied.
pub fn section<'t>(text: &'t str, heading: &Regex, end: &Regex) -> Option<&'t str> {
    let m = heading.find(text)?;
    let rest = &text[m.end()..];
    let stop = end.find(rest).map(|t| m.end() + t.start()).unwrap_or(text.len());
    Some(&text[m.start()..stop])
}
