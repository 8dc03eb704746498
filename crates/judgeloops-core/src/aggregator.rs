use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::EvalError;
use crate::outcome::{percentage, ScoreReport};
use crate::result::{EvalResult, JudgeOutcome};

/// Single consumer of judge results.
///
/// Tallies outcomes and writes one `Failed ID: <id>` line per failed case
/// to the failure log. Errored cases are counted separately and never
/// written to the log.
pub struct Aggregator<W: Write> {
    failure_log: W,
    started: Instant,
}

impl Aggregator<BufWriter<File>> {
    /// Create (or truncate) the failure log at `path`
    pub fn create(path: &Path) -> Result<Self, EvalError> {
        let file = File::create(path).map_err(|source| EvalError::FailureLog {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Aggregator<W> {
    /// The elapsed time in the report is measured from here
    pub fn new(failure_log: W) -> Self {
        Self {
            failure_log,
            started: Instant::now(),
        }
    }

    /// Measure elapsed time from an earlier instant
    pub fn with_start(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    /// Drain `results` until every sender is gone
    pub async fn consume(
        &mut self,
        mut results: mpsc::Receiver<EvalResult>,
    ) -> Result<ScoreReport, EvalError> {
        let mut passed = 0;
        let mut failed = 0;
        let mut errored_ids = Vec::new();

        while let Some(result) = results.recv().await {
            match result.outcome {
                JudgeOutcome::Passed => passed += 1,
                JudgeOutcome::Failed => {
                    failed += 1;
                    writeln!(self.failure_log, "Failed ID: {}", result.id)?;
                }
                JudgeOutcome::Errored => {
                    warn!(id = %result.id, reason = ?result.reason, "Case could not be judged");
                    errored_ids.push(result.id);
                }
            }
        }

        self.failure_log.flush()?;

        errored_ids.sort();
        let errored = errored_ids.len();
        let total = passed + failed + errored;
        debug!(total, passed, failed, errored, "Result stream closed");

        Ok(ScoreReport {
            total,
            passed,
            failed,
            errored,
            errored_ids,
            accuracy: percentage(passed, passed + failed),
            interrupted: false,
            duration_secs: self.started.elapsed().as_secs_f64(),
        })
    }

    pub fn into_inner(self) -> W {
        self.failure_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use judgeloops_judge::Verdict;

    async fn feed(results: Vec<EvalResult>) -> (ScoreReport, String) {
        let (tx, rx) = mpsc::channel(results.len().max(1));
        for result in results {
            tx.send(result).await.unwrap();
        }
        drop(tx);

        let mut aggregator = Aggregator::new(Vec::new());
        let report = aggregator.consume(rx).await.unwrap();
        let log = String::from_utf8(aggregator.into_inner()).unwrap();
        (report, log)
    }

    #[tokio::test]
    async fn test_counts_and_failure_log() {
        let (report, log) = feed(vec![
            EvalResult::judged("a".into(), Verdict::Pass, "1".into()),
            EvalResult::judged("b".into(), Verdict::Fail, "0".into()),
            EvalResult::judged("c".into(), Verdict::Pass, "1".into()),
            EvalResult::judged("d".into(), Verdict::Fail, "no".into()),
        ])
        .await;

        assert_eq!(report.total, 4);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.accuracy, Some(50.0));
        assert_eq!(log, "Failed ID: b\nFailed ID: d\n");
    }

    #[tokio::test]
    async fn test_errored_results_stay_out_of_accuracy_and_log() {
        let (report, log) = feed(vec![
            EvalResult::judged("a".into(), Verdict::Pass, "1".into()),
            EvalResult::errored("z".into(), "timed out".into()),
            EvalResult::errored("y".into(), "timed out".into()),
        ])
        .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.errored, 2);
        assert_eq!(report.errored_ids, vec!["y".to_string(), "z".to_string()]);
        assert_eq!(report.accuracy, Some(100.0));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_empty_stream_has_no_accuracy() {
        let (report, log) = feed(Vec::new()).await;
        assert_eq!(report.total, 0);
        assert_eq!(report.accuracy, None);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_only_errors_has_no_accuracy() {
        let (report, _) = feed(vec![EvalResult::errored("a".into(), "boom".into())]).await;
        assert_eq!(report.total, 1);
        assert_eq!(report.accuracy, None);
    }
}
