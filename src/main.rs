use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod git;
mod hook;

#[derive(Parser)]
#[command(name = "sextant", version, about = "Score AI orchestration sessions from the terminal")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a session transcript file (use '-' to read stdin)
    Score {
        /// Path to a .md, .txt or .jsonl transcript, or '-' for stdin
        file: String,
        /// Output raw JSON instead of the formatted report
        #[arg(long)]
        json: bool,
        /// Skip recording the score to the local history
        #[arg(long)]
        no_save: bool,
    },
    /// Install the git post-commit hook (auto-score on every commit)
    Enable,
    /// Remove the git hook
    Disable,
    /// Show hook status and recent scores
    Status,
    /// Score session files touched by the last commit (run by the hook)
    ScoreRecent,
    /// Start the JSON-RPC scoring server
    Serve {
        #[arg(long, default_value_t = 9311)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sextant=debug,sextant_engine=debug,sextant_store=debug,sextant_server=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Score { file, json, no_save } => commands::score(&file, json, no_save).await,
        Commands::Enable => commands::enable(),
        Commands::Disable => commands::disable(),
        Commands::Status => commands::status(),
        Commands::ScoreRecent => commands::score_recent().await,
        Commands::Serve { port } => commands::serve(port).await,
    }
}
