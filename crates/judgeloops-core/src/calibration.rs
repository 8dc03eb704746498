use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use judgeloops_dataset::HumanLabeledRow;
use judgeloops_judge::{JudgeEvaluationInput, JudgeEvaluator, PromptStyle, Verdict};
use judgeloops_logging::{LogEvent, Logger, Stage};
use judgeloops_provider::Provider;

use crate::outcome::{percentage, CalibrationReport, Mismatch};

/// Pause between judge calls when none is configured
pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(1);

/// Measures judge agreement against human labels.
///
/// Rows are judged one at a time with a single call each. A row whose call
/// fails is skipped and counts toward nothing but `skipped`.
pub struct AlignmentCalibrator<'a> {
    provider: &'a dyn Provider,
    throttle: Duration,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
}

impl<'a> AlignmentCalibrator<'a> {
    pub fn new(provider: &'a dyn Provider, logger: Arc<Logger>) -> Self {
        Self {
            provider,
            throttle: DEFAULT_THROTTLE,
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pause between consecutive judge calls
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub async fn run(&self, rows: &[HumanLabeledRow]) -> CalibrationReport {
        let started = Instant::now();
        let evaluator = JudgeEvaluator::new(self.provider, PromptStyle::Alignment);

        let mut total = 0;
        let mut matches = 0;
        let mut actual_failures = 0;
        let mut failures_caught = 0;
        let mut skipped = 0;
        let mut mismatches = Vec::new();
        let mut interrupted = false;

        self.logger.log(&LogEvent::StageStarted {
            stage: Stage::Alignment,
            total: rows.len(),
            provider: self.provider.name().to_string(),
        });

        for (index, row) in rows.iter().enumerate() {
            if self.interrupted.load(Ordering::SeqCst) {
                info!(processed = index, "Alignment interrupted by user");
                interrupted = true;
                break;
            }

            if index > 0 && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }

            let input = JudgeEvaluationInput {
                reference: &row.reference,
                system_answer: &row.system_answer,
            };

            let judgement = match evaluator.evaluate(input).await {
                Ok(judgement) => judgement,
                Err(e) => {
                    skipped += 1;
                    self.logger.log(&LogEvent::RowSkipped {
                        id: row.id.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            total += 1;
            let verdict = judgement.verdict;

            if verdict == row.human_label {
                matches += 1;
            } else {
                debug!(id = %row.id, raw = %judgement.raw_output, "Judge disagrees with reviewer");
                self.logger.log(&LogEvent::Mismatch {
                    id: row.id.clone(),
                    human: row.human_label.label().to_string(),
                    judge: verdict.label().to_string(),
                });
                mismatches.push(Mismatch {
                    id: row.id.clone(),
                    human: row.human_label,
                    judge: verdict,
                });
            }

            if row.human_label == Verdict::Fail {
                actual_failures += 1;
                if verdict == Verdict::Fail {
                    failures_caught += 1;
                }
            }

            self.logger.log(&LogEvent::RowJudged {
                processed: total,
                agreement_pct: percentage(matches, total).unwrap_or_default(),
            });
        }

        let duration = started.elapsed();
        let processed = total + skipped;
        if interrupted {
            self.logger.log(&LogEvent::StageInterrupted {
                stage: Stage::Alignment,
                processed,
            });
        } else {
            self.logger.log(&LogEvent::StageCompleted {
                stage: Stage::Alignment,
                processed,
                duration_secs: duration.as_secs_f64(),
            });
        }

        CalibrationReport {
            total,
            matches,
            actual_failures,
            failures_caught,
            skipped,
            mismatches,
            agreement_rate: percentage(matches, total),
            defect_recall: percentage(failures_caught, actual_failures),
            interrupted,
            duration_secs: duration.as_secs_f64(),
        }
    }
}
