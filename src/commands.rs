//! Command implementations for the sextant CLI.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use sextant_core::{OrchestrationSignals, SessionId, SessionScore};
use sextant_engine::{classify_quality, extract_signals, sanitize, score_session, QualityAssessment};
use sextant_server::{HandlerState, ServerConfig};
use sextant_store::{Database, ScoreRepo, ScoreRow};

use crate::display;
use crate::git::{find_git_root, GitRunner};
use crate::hook;

const SESSION_EXTENSIONS: &[&str] = &[".md", ".txt", ".jsonl"];

/// `sextant score <file|->`
pub async fn score(file: &str, json: bool, no_save: bool) -> anyhow::Result<()> {
    let (content, filename) = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        (buf, "session.md".to_string())
    } else {
        let path = PathBuf::from(file);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read file: {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("session.md")
            .to_string();
        (content, filename)
    };

    let sanitized = sanitize(&content);
    let signals = extract_signals(&sanitized, &filename)?;
    let result = score_session(&signals, SessionId::new(), None, None).await;
    let quality = classify_quality(result.overall_score);

    if json {
        println!("{}", serde_json::to_string_pretty(&json_payload(&result, &quality, &signals))?);
    } else {
        display::print_report(&result, &quality, &signals);
    }

    if !no_save {
        save_score(&filename, &result, &quality, &signals);
    }

    Ok(())
}

/// `sextant enable`
pub fn enable() -> anyhow::Result<()> {
    let git_root = require_git_root()?;
    match hook::install(&git_root)? {
        hook::InstallOutcome::Installed => display::print_hook_installed(),
        hook::InstallOutcome::AlreadyInstalled => {
            println!("sextant hook is already in .git/hooks/post-commit");
        }
    }
    Ok(())
}

/// `sextant disable`
pub fn disable() -> anyhow::Result<()> {
    let git_root = require_git_root()?;
    match hook::remove(&git_root)? {
        hook::RemoveOutcome::Removed => println!("sextant hook removed."),
        hook::RemoveOutcome::NotInstalled => {
            println!("sextant hook not found in .git/hooks/post-commit.");
        }
        hook::RemoveOutcome::NoHookFile => {
            println!("No post-commit hook found, nothing to remove.");
        }
    }
    Ok(())
}

/// `sextant status`
pub fn status() -> anyhow::Result<()> {
    let git_root = require_git_root()?;
    let installed = hook::is_installed(&git_root);

    let recent = if store_path(&git_root).exists() {
        match open_repo(&git_root) {
            Ok(repo) => repo.recent(5).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "could not open score history");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    display::print_status(installed, &recent);
    Ok(())
}

/// `sextant score-recent`, run by the post-commit hook. Quiet on failure so a
/// broken setup never blocks commits.
pub async fn score_recent() -> anyhow::Result<()> {
    let Some(git_root) = find_git_root(&std::env::current_dir()?) else {
        return Ok(());
    };

    let committed = match GitRunner::new(&git_root).head_commit_files().await {
        Ok(files) => files,
        Err(e) => {
            debug!(error = %e, "could not list committed files");
            return Ok(());
        }
    };

    for rel_path in committed
        .iter()
        .filter(|f| SESSION_EXTENSIONS.iter().any(|ext| f.ends_with(ext)))
    {
        let abs_path = git_root.join(rel_path);
        let Ok(content) = std::fs::read_to_string(&abs_path) else {
            continue;
        };
        let filename = abs_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("session.md");

        let sanitized = sanitize(&content);
        let Ok(signals) = extract_signals(&sanitized, filename) else {
            continue;
        };

        // Only score files that look like sessions.
        if !signals.has_orchestration_signals() {
            continue;
        }

        let result = score_session(&signals, SessionId::new(), None, None).await;
        let quality = classify_quality(result.overall_score);
        save_score(rel_path, &result, &quality, &signals);
        display::print_compact(rel_path, &result, &quality);
    }

    Ok(())
}

/// `sextant serve --port N`
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let mut state = HandlerState::new();
    if let Some(git_root) = find_git_root(&std::env::current_dir()?) {
        match open_repo(&git_root) {
            Ok(repo) => state = state.with_scores(repo),
            Err(e) => warn!(error = %e, "score history unavailable to the server"),
        }
    }

    let handle = sextant_server::start(ServerConfig { port }, state)
        .await
        .context("start server")?;
    println!("sextant server listening on port {}", handle.port);

    tokio::signal::ctrl_c().await.context("wait for ctrl+c")?;
    println!("shutting down");
    Ok(())
}

fn require_git_root() -> anyhow::Result<PathBuf> {
    find_git_root(&std::env::current_dir()?).context("Not inside a git repository.")
}

fn store_path(git_root: &Path) -> PathBuf {
    git_root.join(".sextant").join("sextant.db")
}

fn open_repo(git_root: &Path) -> anyhow::Result<ScoreRepo> {
    let db = Database::open(&store_path(git_root))?;
    Ok(ScoreRepo::new(db))
}

/// Record a score in the local history. Best-effort: storage problems are
/// logged, never surfaced to the scoring flow.
fn save_score(
    file: &str,
    score: &SessionScore,
    quality: &QualityAssessment,
    signals: &OrchestrationSignals,
) {
    let Some(git_root) = std::env::current_dir()
        .ok()
        .as_deref()
        .and_then(find_git_root)
    else {
        return;
    };

    let result = open_repo(&git_root).and_then(|repo| {
        let row = ScoreRow::from_score(file, score, quality.tier, signals)?;
        repo.insert(&row)?;
        Ok(())
    });
    if let Err(e) = result {
        warn!(error = %e, "could not save score to history");
    }
}

fn json_payload(
    score: &SessionScore,
    quality: &QualityAssessment,
    signals: &OrchestrationSignals,
) -> serde_json::Value {
    serde_json::json!({
        "sessionId": score.session_id,
        "overallScore": score.overall_score,
        "tier": quality.tier.to_string(),
        "description": quality.description,
        "breakdown": score.breakdown,
        "weights": score.weights,
        "version": score.version,
        "scoredAt": score.scored_at,
        "signals": {
            "skills": signals.skills_invoked,
            "agents": signals.agents_spawned.len(),
            "decisions": signals.decision_points.len(),
            "errorsRecovered": signals.errors_recovered.len(),
            "learnings": signals.compound_learnings.len(),
            "complexity": signals.metadata.complexity,
        },
    })
}
