use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use judgeloops_dataset::{EvalCase, GeneratedCase, JsonlWriter};
use judgeloops_logging::{LogEvent, Logger, Stage};
use judgeloops_provider::Provider;

use crate::error::EvalError;
use crate::outcome::GenerationSummary;
use crate::retry::{reject_blank, RetryPolicy};

/// Written in place of an answer when every generation attempt failed
pub const GENERATION_FAILURE_SENTINEL: &str = "ERROR_GENERATING";

/// Produces an answer for every case, one at a time and in input order.
///
/// Each record is appended and flushed before the next case starts, so
/// stopping after N cases leaves exactly N complete records on disk.
pub struct GenerationRunner<'a> {
    provider: &'a dyn Provider,
    retry: RetryPolicy,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
}

impl<'a> GenerationRunner<'a> {
    pub fn new(provider: &'a dyn Provider, retry: RetryPolicy, logger: Arc<Logger>) -> Self {
        Self {
            provider,
            retry,
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing interrupt flag instead of owning one
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub async fn run<W: Write>(
        &self,
        cases: Vec<EvalCase>,
        writer: &mut JsonlWriter<W>,
    ) -> Result<GenerationSummary, EvalError> {
        let started = Instant::now();
        let total = cases.len();
        let mut failed = 0;

        self.logger.log(&LogEvent::StageStarted {
            stage: Stage::Generation,
            total,
            provider: self.provider.name().to_string(),
        });

        for (index, case) in cases.into_iter().enumerate() {
            if self.interrupted.load(Ordering::SeqCst) {
                info!(processed = index, "Generation interrupted by user");
                self.logger.log(&LogEvent::StageInterrupted {
                    stage: Stage::Generation,
                    processed: index,
                });
                return Ok(GenerationSummary::new(
                    index,
                    failed,
                    true,
                    started.elapsed(),
                ));
            }

            debug!(id = %case.id, index, "Generating answer");

            let outcome = self
                .retry
                .run_checked(|| self.provider.generate(&case.prompt), reject_blank)
                .await;

            let system_answer = match outcome {
                Ok(answer) => {
                    self.logger.log(&LogEvent::CaseGenerated {
                        index,
                        total,
                        id: case.id.clone(),
                        attempts: answer.attempts,
                    });
                    answer.value
                }
                Err(e) => {
                    failed += 1;
                    self.logger.log(&LogEvent::GenerationFailed {
                        index,
                        total,
                        id: case.id.clone(),
                        error: e.to_string(),
                    });
                    GENERATION_FAILURE_SENTINEL.to_string()
                }
            };

            writer.append(&GeneratedCase::new(case, system_answer))?;
        }

        let duration = started.elapsed();
        self.logger.log(&LogEvent::StageCompleted {
            stage: Stage::Generation,
            processed: total,
            duration_secs: duration.as_secs_f64(),
        });

        Ok(GenerationSummary::new(total, failed, false, duration))
    }
}
