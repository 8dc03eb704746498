use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use judgeloops_core::{CalibrationReport, GenerationSummary, ScoreReport};

use crate::RunContext;

pub fn print_prep(ctx: &RunContext, available: usize, written: usize, output: &Path) {
    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "available": available, "written": written })
        );
        return;
    }

    eprintln!();
    eprintln!("=== GOLDEN SET ===");
    eprintln!("Records read: {}", available);
    eprintln!("Hard cases sampled: {}", written);
    eprintln!("Saved to: {}", output.display());
}

pub fn print_export(ctx: &RunContext, written: usize, output: &Path) {
    if ctx.json_output {
        println!("{}", serde_json::json!({ "written": written }));
        return;
    }

    eprintln!();
    eprintln!("=== REVIEW SHEET ===");
    eprintln!("Rows: {}", written);
    eprintln!("Saved to: {}", output.display());
    eprintln!("Fill in column 4 with 1 (correct) or 0 (incorrect).");
}

pub fn print_generation(
    ctx: &RunContext,
    summary: &GenerationSummary,
    output: &Path,
) -> Result<()> {
    if ctx.json_output {
        return print_json(summary);
    }

    eprintln!();
    if summary.interrupted {
        eprintln!("=== GENERATION INTERRUPTED ===");
    } else {
        eprintln!("=== GENERATION COMPLETE ===");
    }
    eprintln!("Records written: {}", summary.processed);
    if summary.failed > 0 {
        eprintln!(
            "{}",
            format!("Failed after retries: {}", summary.failed).bright_red()
        );
    }
    eprintln!("Duration: {:.1}s", summary.duration_secs);
    eprintln!("Saved to: {}", output.display());
    Ok(())
}

pub fn print_score(ctx: &RunContext, score: &ScoreReport, failures: &Path) -> Result<()> {
    if ctx.json_output {
        return print_json(score);
    }

    eprintln!();
    if score.interrupted {
        eprintln!("=== JUDGING INTERRUPTED ===");
    } else {
        eprintln!("=== FINAL REPORT ===");
    }
    eprintln!("Total processed: {}", score.total);
    eprintln!("Passed: {}", score.passed.to_string().bright_green());
    eprintln!("Failed: {}", score.failed.to_string().bright_red());
    if score.errored > 0 {
        eprintln!(
            "Judge errors: {} (not counted in accuracy)",
            score.errored.to_string().bright_yellow()
        );
        for id in &score.errored_ids {
            eprintln!("  {}", id.dimmed());
        }
    }
    eprintln!("Duration: {:.1}s", score.duration_secs);
    eprintln!("Accuracy: {}", format_rate(score.accuracy).bold());
    if score.failed > 0 {
        eprintln!("Failed IDs written to {}", failures.display());
    }
    Ok(())
}

pub fn print_calibration(
    ctx: &RunContext,
    calibration: &CalibrationReport,
    unlabeled: usize,
) -> Result<()> {
    if ctx.json_output {
        return print_json(calibration);
    }

    eprintln!();
    if calibration.interrupted {
        eprintln!("=== ALIGNMENT INTERRUPTED ===");
    } else {
        eprintln!("=== JUDGE ALIGNMENT ===");
    }
    eprintln!("Rows judged: {}", calibration.total);
    if calibration.skipped > 0 {
        eprintln!("Rows skipped (judge call failed): {}", calibration.skipped);
    }
    if unlabeled > 0 {
        eprintln!("Rows without a human label: {}", unlabeled);
    }
    eprintln!(
        "Agreement: {} ({}/{})",
        format_rate(calibration.agreement_rate).bold(),
        calibration.matches,
        calibration.total
    );
    match calibration.defect_recall {
        Some(recall) => eprintln!(
            "Defect recall: {} ({}/{} known-bad answers caught)",
            format!("{:.2}%", recall).bold(),
            calibration.failures_caught,
            calibration.actual_failures
        ),
        None => eprintln!("Defect recall: n/a (no answers labeled incorrect)"),
    }

    if !calibration.mismatches.is_empty() {
        eprintln!();
        eprintln!("Disagreements:");
        for mismatch in &calibration.mismatches {
            eprintln!(
                "  {} human={} judge={}",
                mismatch.id, mismatch.human, mismatch.judge
            );
        }
    }
    eprintln!("Duration: {:.1}s", calibration.duration_secs);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.2}%", rate),
        None => "n/a".to_string(),
    }
}
