use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use judgeloops_dataset::GeneratedCase;
use judgeloops_judge::{JudgeEvaluationInput, JudgeEvaluator, PromptStyle};
use judgeloops_logging::{LogEvent, Logger, Stage};
use judgeloops_provider::Provider;

use crate::aggregator::Aggregator;
use crate::error::EvalError;
use crate::outcome::ScoreReport;
use crate::result::EvalResult;
use crate::retry::RetryPolicy;

/// A judging run in flight.
///
/// `results` yields one [`EvalResult`] per judged case in whatever order the
/// workers finish. It closes once every worker has exited; `completion`
/// resolves to the number of results the workers sent.
pub struct JudgeRun {
    pub results: mpsc::Receiver<EvalResult>,
    pub completion: JoinHandle<usize>,
}

/// Fixed-size pool of judge workers over a shared job queue
pub struct JudgePipeline {
    provider: Arc<dyn Provider>,
    workers: usize,
    retry: RetryPolicy,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
}

impl JudgePipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        workers: usize,
        retry: RetryPolicy,
        logger: Arc<Logger>,
    ) -> Result<Self, EvalError> {
        if workers == 0 {
            return Err(EvalError::ConfigError(
                "judge worker count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            provider,
            workers,
            retry,
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
        })
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

    /// Queue every case and start the workers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, cases: Vec<GeneratedCase>) -> JudgeRun {
        let capacity = cases.len().max(1);

        // Sized to hold every job, so filling it never waits on a worker
        let (job_tx, job_rx) = mpsc::channel(capacity);
        for case in cases {
            if job_tx.try_send(case).is_err() {
                warn!("Job queue rejected a case");
            }
        }
        drop(job_tx);

        let jobs = Arc::new(Mutex::new(job_rx));
        let (result_tx, result_rx) = mpsc::channel(capacity);

        let handles: Vec<JoinHandle<usize>> = (0..self.workers)
            .map(|worker| {
                tokio::spawn(judge_worker(
                    worker,
                    self.provider.clone(),
                    self.retry,
                    self.logger.clone(),
                    jobs.clone(),
                    result_tx.clone(),
                    self.interrupted.clone(),
                ))
            })
            .collect();

        // Workers hold the only remaining senders
        drop(result_tx);

        let completion = tokio::spawn(async move {
            let mut sent = 0;
            for handle in handles {
                match handle.await {
                    Ok(count) => sent += count,
                    Err(e) => warn!(error = %e, "Judge worker did not finish cleanly"),
                }
            }
            sent
        });

        JudgeRun {
            results: result_rx,
            completion,
        }
    }

    /// Judge every case and feed the results through `aggregator`
    pub async fn run<W: Write>(
        &self,
        cases: Vec<GeneratedCase>,
        aggregator: &mut Aggregator<W>,
    ) -> Result<ScoreReport, EvalError> {
        let total = cases.len();

        self.logger.log(&LogEvent::StageStarted {
            stage: Stage::Judging,
            total,
            provider: self.provider.name().to_string(),
        });

        let run = self.spawn(cases);
        let mut report = aggregator.consume(run.results).await?;

        match run.completion.await {
            Ok(sent) => debug!(sent, "All judge workers finished"),
            Err(e) => warn!(error = %e, "Judge completion task failed"),
        }

        if report.total < total && self.interrupted.load(Ordering::SeqCst) {
            info!(processed = report.total, "Judging interrupted by user");
            report.interrupted = true;
            self.logger.log(&LogEvent::StageInterrupted {
                stage: Stage::Judging,
                processed: report.total,
            });
        } else {
            self.logger.log(&LogEvent::StageCompleted {
                stage: Stage::Judging,
                processed: report.total,
                duration_secs: report.duration_secs,
            });
        }

        Ok(report)
    }
}

async fn judge_worker(
    worker: usize,
    provider: Arc<dyn Provider>,
    retry: RetryPolicy,
    logger: Arc<Logger>,
    jobs: Arc<Mutex<mpsc::Receiver<GeneratedCase>>>,
    results: mpsc::Sender<EvalResult>,
    interrupted: Arc<AtomicBool>,
) -> usize {
    let evaluator = JudgeEvaluator::new(provider.as_ref(), PromptStyle::Grading);
    let mut sent = 0;

    loop {
        if interrupted.load(Ordering::SeqCst) {
            debug!(worker, "Worker stopping on interrupt");
            break;
        }

        let next = jobs.lock().await.recv().await;
        let Some(case) = next else {
            break;
        };

        let input = JudgeEvaluationInput {
            reference: case.reference(),
            system_answer: &case.system_answer,
        };

        let result = match retry.run(|| evaluator.evaluate(input)).await {
            Ok(judgement) => {
                logger.log(&LogEvent::CaseJudged {
                    id: case.id().to_string(),
                    worker,
                    passed: judgement.value.verdict.is_pass(),
                    attempts: judgement.attempts,
                });
                EvalResult::judged(
                    case.id().to_string(),
                    judgement.value.verdict,
                    judgement.value.raw_output,
                )
            }
            Err(e) => {
                logger.log(&LogEvent::JudgeErrored {
                    id: case.id().to_string(),
                    worker,
                    error: e.to_string(),
                });
                EvalResult::errored(case.id().to_string(), e.to_string())
            }
        };

        if results.send(result).await.is_err() {
            debug!(worker, "Result receiver dropped, stopping");
            break;
        }
        sent += 1;
    }

    sent
}
