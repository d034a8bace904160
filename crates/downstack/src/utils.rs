//! Console helpers shared by the command handlers.

use colored::Colorize;
use downstack_core::{Outcome, RunReport};
use std::io::Write;

/// Interactive guard for destructive runs: the operator must type the
/// environment name back. Skipped entirely under --force and --dry-run.
pub fn confirm_environment(environment: &str) -> anyhow::Result<()> {
    println!(
        "{}",
        format!(
            "This will permanently delete every stack and leftover resource of '{environment}'."
        )
        .red()
        .bold()
    );
    print!("Type the environment name to confirm: ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    if answer.trim() != environment {
        anyhow::bail!("confirmation did not match '{environment}', aborting");
    }
    Ok(())
}

fn outcome_label(outcome: Outcome) -> colored::ColoredString {
    match outcome {
        Outcome::Deleted => "deleted".green(),
        Outcome::Failed => "FAILED".red().bold(),
        Outcome::SkippedAlreadyAbsent => "already absent".dimmed(),
        Outcome::DryRunPreview => "preview".yellow(),
    }
}

/// Final per-resource table plus the one-line summary.
pub fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("{}", "Results:".bold());
    for result in &report.results {
        let status = result
            .last_status
            .as_ref()
            .map(|s| format!(" (last status: {s})"))
            .unwrap_or_default();
        println!(
            "  {} {} — {}{}",
            "•".cyan(),
            result.name,
            outcome_label(result.outcome),
            status.dimmed()
        );
    }

    println!();
    if report.is_success() {
        println!("{} {}", "✓".green().bold(), report.to_string().green());
    } else {
        println!("{} {}", "✗".red().bold(), report.to_string().red());
        for failure in report.ordered_failures() {
            println!(
                "{}",
                format!(
                    "  {} ended in failure; check the provider console before re-running",
                    failure.name
                )
                .red()
            );
        }
    }
    Ok(())
}
