//! # judgeloops-core
//!
//! The evaluation stages and the bookkeeping around them.
//!
//! ## Stages
//!
//! - [`GenerationRunner`] - answers every golden case in order, streaming to disk
//! - [`JudgePipeline`] - judges generated answers on a fixed pool of workers
//! - [`Aggregator`] - tallies judge results and writes the failure log
//! - [`AlignmentCalibrator`] - compares judge verdicts with human labels
//!
//! Every provider call in generation and judging goes through a
//! [`RetryPolicy`]. Calibration calls the judge once per row.

mod aggregator;
mod calibration;
mod error;
mod generation;
mod outcome;
mod pipeline;
mod result;
mod retry;

pub use aggregator::Aggregator;
pub use calibration::{AlignmentCalibrator, DEFAULT_THROTTLE};
pub use error::EvalError;
pub use generation::{GenerationRunner, GENERATION_FAILURE_SENTINEL};
pub use outcome::{percentage, CalibrationReport, GenerationSummary, Mismatch, ScoreReport};
pub use pipeline::{JudgePipeline, JudgeRun};
pub use result::{EvalResult, JudgeOutcome};
pub use retry::{reject_blank, Retried, RetryError, RetryPolicy};
