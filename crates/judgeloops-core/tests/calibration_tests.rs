mod common;

use std::time::{Duration, Instant};

use common::{quiet_logger, StubProvider};
use judgeloops_core::AlignmentCalibrator;
use judgeloops_dataset::HumanLabeledRow;
use judgeloops_judge::Verdict;
use judgeloops_provider::ProviderError;

fn row(id: &str, answer: &str, label: Verdict) -> HumanLabeledRow {
    HumanLabeledRow {
        id: id.to_string(),
        reference: "reference".to_string(),
        system_answer: answer.to_string(),
        human_label: label,
        notes: None,
    }
}

/// Rejects answers tagged `flag-me`, errors on `explode`, passes the rest
fn tagged_judge() -> StubProvider {
    StubProvider::new(|prompt| {
        if prompt.contains("explode") {
            Err(ProviderError::ExecutionFailed("rate limited".into()))
        } else if prompt.contains("flag-me") {
            Ok("0".to_string())
        } else {
            Ok("1".to_string())
        }
    })
}

fn ten_rows() -> Vec<HumanLabeledRow> {
    let mut rows: Vec<HumanLabeledRow> = (0..7)
        .map(|i| row(&format!("good-{i}"), "right answer", Verdict::Pass))
        .collect();
    rows.push(row("bad-0", "wrong flag-me", Verdict::Fail));
    rows.push(row("bad-1", "wrong flag-me", Verdict::Fail));
    rows.push(row("bad-2", "wrong but missed", Verdict::Fail));
    rows
}

#[tokio::test]
async fn test_defect_recall_two_of_three() {
    let provider = tagged_judge();
    let report = AlignmentCalibrator::new(&provider, quiet_logger())
        .with_throttle(Duration::ZERO)
        .run(&ten_rows())
        .await;

    assert_eq!(report.total, 10);
    assert_eq!(report.actual_failures, 3);
    assert_eq!(report.failures_caught, 2);
    assert_eq!(report.matches, 9);
    assert_eq!(report.agreement_rate, Some(90.0));

    let recall = report.defect_recall.unwrap();
    assert!((recall - 66.67).abs() < 0.01);
    assert_eq!(format!("{recall:.2}"), "66.67");

    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].id, "bad-2");
    assert_eq!(report.mismatches[0].human, Verdict::Fail);
    assert_eq!(report.mismatches[0].judge, Verdict::Pass);
}

#[tokio::test]
async fn test_failed_call_skips_row_without_retry() {
    let provider = tagged_judge();
    let rows = vec![
        row("ok", "right answer", Verdict::Pass),
        row("boom", "explode", Verdict::Fail),
        row("caught", "flag-me", Verdict::Fail),
    ];

    let report = AlignmentCalibrator::new(&provider, quiet_logger())
        .with_throttle(Duration::ZERO)
        .run(&rows)
        .await;

    assert_eq!(provider.calls(), 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.total, 2);
    assert_eq!(report.actual_failures, 1);
    assert_eq!(report.defect_recall, Some(100.0));
}

#[tokio::test]
async fn test_no_incorrect_labels_means_no_recall() {
    let provider = tagged_judge();
    let rows = vec![row("a", "fine", Verdict::Pass), row("b", "fine", Verdict::Pass)];

    let report = AlignmentCalibrator::new(&provider, quiet_logger())
        .with_throttle(Duration::ZERO)
        .run(&rows)
        .await;

    assert_eq!(report.actual_failures, 0);
    assert_eq!(report.defect_recall, None);
    assert_eq!(report.agreement_rate, Some(100.0));
}

#[tokio::test]
async fn test_empty_input_has_no_rates() {
    let provider = tagged_judge();
    let report = AlignmentCalibrator::new(&provider, quiet_logger())
        .run(&[])
        .await;

    assert_eq!(report.total, 0);
    assert_eq!(report.agreement_rate, None);
    assert_eq!(report.defect_recall, None);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_throttle_between_calls() {
    let provider = tagged_judge();
    let rows = vec![
        row("a", "fine", Verdict::Pass),
        row("b", "fine", Verdict::Pass),
        row("c", "fine", Verdict::Pass),
    ];

    let started = Instant::now();
    AlignmentCalibrator::new(&provider, quiet_logger())
        .with_throttle(Duration::from_millis(40))
        .run(&rows)
        .await;

    // Pauses go between calls, not before the first one
    assert!(started.elapsed() >= Duration::from_millis(80));
}

#[tokio::test]
async fn test_interrupt_stops_calibration() {
    let provider = tagged_judge();
    let calibrator =
        AlignmentCalibrator::new(&provider, quiet_logger()).with_throttle(Duration::ZERO);
    calibrator
        .interrupt_handle()
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let report = calibrator.run(&ten_rows()).await;
    assert!(report.interrupted);
    assert_eq!(provider.calls(), 0);
}
