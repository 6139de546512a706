//! Git post-commit hook management. The hook block is delimited by a marker
//! comment so install and remove never touch foreign hook content.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

pub const HOOK_MARKER: &str = "# sextant-hook";

#[derive(Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotInstalled,
    NoHookFile,
}

pub fn hook_path(git_root: &Path) -> PathBuf {
    git_root.join(".git").join("hooks").join("post-commit")
}

/// Install the post-commit hook block. Appends to an existing hook script,
/// creates an executable one otherwise. Idempotent via the marker.
pub fn install(git_root: &Path) -> anyhow::Result<InstallOutcome> {
    let path = hook_path(git_root);
    let block = format!("\n{HOOK_MARKER}\n{}\n", hook_command());

    if path.exists() {
        let existing = fs::read_to_string(&path).context("read post-commit hook")?;
        if existing.contains(HOOK_MARKER) {
            return Ok(InstallOutcome::AlreadyInstalled);
        }
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .context("append to post-commit hook")?;
        file.write_all(block.as_bytes())?;
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create hooks directory")?;
        }
        fs::write(&path, format!("#!/bin/sh{block}")).context("write post-commit hook")?;
        make_executable(&path)?;
    }

    ensure_gitignore(git_root)?;
    Ok(InstallOutcome::Installed)
}

/// Remove the marker-delimited block, leaving any foreign hook content intact.
pub fn remove(git_root: &Path) -> anyhow::Result<RemoveOutcome> {
    let path = hook_path(git_root);
    if !path.exists() {
        return Ok(RemoveOutcome::NoHookFile);
    }

    let content = fs::read_to_string(&path).context("read post-commit hook")?;
    if !content.contains(HOOK_MARKER) {
        return Ok(RemoveOutcome::NotInstalled);
    }

    // Drop the marker line and everything after it until a blank line.
    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;
    for line in content.lines() {
        if line == HOOK_MARKER {
            skipping = true;
            continue;
        }
        if skipping {
            if line.trim().is_empty() {
                skipping = false;
            }
            continue;
        }
        kept.push(line);
    }

    fs::write(&path, kept.join("\n")).context("rewrite post-commit hook")?;
    Ok(RemoveOutcome::Removed)
}

pub fn is_installed(git_root: &Path) -> bool {
    let path = hook_path(git_root);
    fs::read_to_string(path)
        .map(|content| content.contains(HOOK_MARKER))
        .unwrap_or(false)
}

/// The hook runs whatever binary installed it, falling back to a PATH lookup.
fn hook_command() -> String {
    let exe = std::env::current_exe()
        .ok()
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "sextant".to_string());
    format!("\"{exe}\" score-recent 2>/dev/null || true")
}

/// Keep local scores out of version control when a .gitignore exists.
fn ensure_gitignore(git_root: &Path) -> anyhow::Result<()> {
    let path = git_root.join(".gitignore");
    if !path.exists() {
        return Ok(());
    }
    let content = fs::read_to_string(&path).context("read .gitignore")?;
    if content.contains(".sextant") {
        return Ok(());
    }
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .context("append to .gitignore")?;
    file.write_all(b"\n# sextant local scores\n.sextant/\n")?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
