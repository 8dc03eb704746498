use judgeloops_judge::Verdict;
use serde::Serialize;
use std::time::Duration;

/// `part / whole * 100`, or `None` when there is nothing to divide by
pub fn percentage(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

/// What the generation stage did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// Records written, sentinel answers included
    pub processed: usize,
    /// Cases that fell back to the failure sentinel
    pub failed: usize,
    pub interrupted: bool,
    pub duration_secs: f64,
}

impl GenerationSummary {
    pub fn new(processed: usize, failed: usize, interrupted: bool, duration: Duration) -> Self {
        Self {
            processed,
            failed,
            interrupted,
            duration_secs: duration.as_secs_f64(),
        }
    }
}

/// Final tally of a judging run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Every result received, errored ones included
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub errored_ids: Vec<String>,
    /// Share of judged cases that passed. Errored cases are left out of the
    /// denominator; `None` when nothing was judged.
    pub accuracy: Option<f64>,
    pub interrupted: bool,
    pub duration_secs: f64,
}

/// A row where judge and human disagreed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub id: String,
    pub human: Verdict,
    pub judge: Verdict,
}

/// How well the judge agrees with the human reviewers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationReport {
    /// Rows where the judge produced a verdict
    pub total: usize,
    pub matches: usize,
    /// Rows the reviewer marked incorrect
    pub actual_failures: usize,
    /// Incorrect rows the judge also rejected
    pub failures_caught: usize,
    /// Rows dropped because the judge call failed
    pub skipped: usize,
    pub mismatches: Vec<Mismatch>,
    pub agreement_rate: Option<f64>,
    /// Only defined when at least one row was labeled incorrect
    pub defect_recall: Option<f64>,
    pub interrupted: bool,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_guards_zero() {
        assert_eq!(percentage(0, 0), None);
        assert_eq!(percentage(1, 2), Some(50.0));
        let recall = percentage(2, 3).unwrap();
        assert!((recall - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_score_report_serializes_missing_accuracy_as_null() {
        let report = ScoreReport {
            total: 0,
            passed: 0,
            failed: 0,
            errored: 0,
            errored_ids: Vec::new(),
            accuracy: None,
            interrupted: false,
            duration_secs: 0.0,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["accuracy"].is_null());
    }
}
