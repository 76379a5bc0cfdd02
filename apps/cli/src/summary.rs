//! Console summary of a finished pipeline run.

use colored::{ColoredString, Colorize};
use vermilion_pipeline::{ApprovalStatus, Outcome, RunResult, TaskKind, TaskOutput};

const BANNER_WIDTH: usize = 80;

/// Prints the run summary banner.
pub fn print_run_summary(result: &RunResult) {
    let banner = "=".repeat(BANNER_WIDTH);

    println!("\n{banner}");
    println!("{}", "VERMILION CONTENT PIPELINE RESULTS".bold().cyan());
    println!("{banner}");

    println!("Request: {}", result.request.topic);
    println!("Platform: {}", result.routing.output().content_type);
    println!("Iterations: {}", result.total_iterations);
    println!("Started: {}", result.started_at.format("%Y-%m-%d %H:%M:%S"));

    let review = result.final_review.output();
    println!("\n{}", "Quality Review:".bold());
    println!("  Overall Score: {}", score_colored(review.overall_quality_score));
    println!("  Approval Status: {}", status_colored(review.approval_status));

    if let Some(TaskOutput::TextGenerator(draft)) =
        result.final_outputs.get(&TaskKind::TextGenerator).map(Outcome::output)
    {
        println!("\n{}", "Content:".bold());
        println!("  Title: {}", draft.title);
        if let Some(word_count) = draft.word_count {
            println!("  Word Count: {word_count}");
        }
    }

    if let Some(TaskOutput::ImageCreator(asset)) =
        result.final_outputs.get(&TaskKind::ImageCreator).map(Outcome::output)
    {
        if asset.success {
            if let Some(path) = &asset.image_path {
                println!("  Image Generated: {}", path.display().to_string().dimmed());
            }
        }
    }

    let degraded: Vec<String> = result
        .final_outputs
        .iter()
        .filter(|(_, outcome)| outcome.is_degraded())
        .map(|(kind, _)| kind.to_string())
        .collect();
    if !degraded.is_empty() {
        println!("\n{} {}", "⚠ Degraded tasks:".yellow(), degraded.join(", "));
    }

    if let Some(path) = &result.files_saved {
        println!("\nResults saved to: {}", path.display().to_string().dimmed());
    }

    println!("{banner}\n");
}

fn score_colored(score: f64) -> ColoredString {
    let text = format!("{score:.1}/10");
    if score >= 7.0 {
        text.green()
    } else if score >= 5.0 {
        text.yellow()
    } else {
        text.red()
    }
}

fn status_colored(status: ApprovalStatus) -> ColoredString {
    match status {
        ApprovalStatus::Approved => "approved".green(),
        ApprovalStatus::NeedsRevision => "needs_revision".yellow(),
        ApprovalStatus::Rejected => "rejected".red(),
    }
}
