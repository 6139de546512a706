//! Terminal rendering for score reports and status output.

use console::{style, Style};

use sextant_core::{OrchestrationSignals, QualityTier, SessionScore};
use sextant_engine::{expected_score_band, QualityAssessment};
use sextant_store::ScoreRow;

const BAR_WIDTH: usize = 20;

pub fn print_error(msg: &str) {
    eprintln!("{}  {msg}", style("error").red().bold());
}

/// Full score report: overall, tier, metric bars, detected signals.
pub fn print_report(score: &SessionScore, quality: &QualityAssessment, signals: &OrchestrationSignals) {
    let tier = tier_style(quality.tier);

    println!();
    println!(
        "  {}  {}",
        style("sextant").white().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!();
    println!(
        "  {} {}  {}",
        tier.apply_to(format!("{}", score.overall_score)).bold(),
        style("/ 100").dim(),
        tier.apply_to(quality.tier.to_string().to_uppercase())
    );
    println!("  {}", style(quality.description).dim());
    println!();

    let weights = [
        score.weights.skill_diversity,
        score.weights.decision_depth,
        score.weights.error_recovery_rate,
        score.weights.compound_learning_signals,
        score.weights.orchestration_mastery,
    ];
    let labels = [
        "Skill Diversity  ",
        "Decision Depth   ",
        "Error Recovery   ",
        "Compound Learning",
        "Orchestration    ",
    ];
    let values = [
        score.breakdown.skill_diversity,
        score.breakdown.decision_depth,
        score.breakdown.error_recovery_rate,
        score.breakdown.compound_learning_signals,
        score.breakdown.orchestration_mastery,
    ];

    for ((label, value), weight) in labels.iter().zip(values).zip(weights) {
        println!(
            "  {}  {}  {}  {}",
            style(label).white(),
            style(format!("({:>2.0}%)", weight * 100.0)).dim(),
            bar(value),
            style(format!("{:>3.0}", value)).cyan().bold()
        );
    }

    println!();
    println!("  {}", style("─".repeat(54)).dim());
    println!();
    println!("  {}", style("Signals detected").bold());
    println!();

    let skill_list = if signals.skills_invoked.is_empty() {
        style("none detected").dim().to_string()
    } else {
        let mut list = signals.skills_invoked[..signals.skills_invoked.len().min(6)].join(", ");
        if signals.skills_invoked.len() > 6 {
            list.push_str(" …");
        }
        style(list).dim().to_string()
    };

    println!(
        "  {}  {:>3}  {}",
        style("Skills    ").dim(),
        signals.skills_invoked.len(),
        skill_list
    );
    println!("  {}  {:>3}", style("Agents    ").dim(), signals.agents_spawned.len());
    println!("  {}  {:>3}", style("Decisions ").dim(), signals.decision_points.len());
    println!("  {}  {:>3}", style("Errors    ").dim(), signals.errors_recovered.len());
    println!("  {}  {:>3}", style("Learnings ").dim(), signals.compound_learnings.len());
    let band = expected_score_band(signals.metadata.complexity);
    println!(
        "  {}  {:>3}  {}",
        style("Complexity").dim(),
        signals.metadata.complexity,
        style(format!(
            "(expected {:.0}, target {:.0}, excellent {:.0})",
            band.min, band.target, band.excellent
        ))
        .dim()
    );
    println!();
}

/// One-line report used by the commit hook.
pub fn print_compact(file: &str, score: &SessionScore, quality: &QualityAssessment) {
    let tier = tier_style(quality.tier);
    println!();
    println!("  {}  {}", style("sextant").white().bold(), style(file).dim());
    println!(
        "  {} {}  {}  {}",
        tier.apply_to(format!("{}", score.overall_score)).bold(),
        style("/ 100").dim(),
        tier.apply_to(quality.tier.to_string().to_uppercase()),
        style(quality.description).dim()
    );
    println!();
}

pub fn print_hook_installed() {
    println!();
    println!("  {} sextant hook installed", style("✓").green().bold());
    println!("  {}  .git/hooks/post-commit", style("Hook path   ").dim());
    println!("  {}  .sextant/ (gitignored)", style("Scores saved").dim());
    println!();
    println!(
        "  {}",
        style("Session files (.md, .txt, .jsonl) committed to this repo").dim()
    );
    println!("  {}", style("will be scored automatically on every commit.").dim());
    println!();
    println!("  {}  sextant disable", style("Disable anytime:").dim());
    println!();
}

pub fn print_status(installed: bool, recent: &[ScoreRow]) {
    println!();
    println!(
        "  {}  {}",
        style("Hook").bold(),
        if installed {
            style("✓ installed").green().to_string()
        } else {
            style("✗ not installed").dim().to_string()
        }
    );

    if !installed {
        println!();
        println!("  Run {} to install.", style("sextant enable").cyan());
        println!();
        return;
    }

    if recent.is_empty() {
        println!();
        println!(
            "  {}",
            style("No scores yet. Commit a session file to score it.").dim()
        );
        println!();
        return;
    }

    println!();
    println!("  {}", style("Recent scores").bold());
    println!();
    for row in recent {
        let date = row.scored_at.get(..10).unwrap_or(&row.scored_at);
        let file = std::path::Path::new(&row.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&row.file);
        println!(
            "  {}  {}  {}  {}",
            style(date).dim(),
            style(format!("{:>5.1}", row.overall_score)).cyan().bold(),
            tier_style(row.tier).apply_to(format!("{:<12}", row.tier)),
            style(file).dim()
        );
    }
    println!();
}

fn bar(value: f64) -> String {
    let filled = ((value / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{}{}",
        style("█".repeat(filled)).cyan(),
        style("░".repeat(BAR_WIDTH - filled)).dim()
    )
}

fn tier_style(tier: QualityTier) -> Style {
    match tier {
        QualityTier::Exceptional => Style::new().cyan().bold(),
        QualityTier::Excellent => Style::new().green().bold(),
        QualityTier::Good => Style::new().green(),
        QualityTier::Fair => Style::new().yellow(),
        QualityTier::Poor => Style::new().red(),
    }
}
