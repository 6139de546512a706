use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tokio::process::Command;
use tracing::debug;

/// Walk up from `start` to the repository root (the directory holding .git).
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Runs git subcommands in a fixed working directory.
pub struct GitRunner {
    working_dir: PathBuf,
}

impl GitRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        debug!(args = ?args, dir = %self.working_dir.display(), "running git command");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .await
            .context("failed to run git")?;

        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Paths touched by the HEAD commit, relative to the repository root.
    pub async fn head_commit_files(&self) -> anyhow::Result<Vec<String>> {
        let out = self
            .run(&["diff-tree", "--no-commit-id", "-r", "--name-only", "HEAD"])
            .await?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }
}
