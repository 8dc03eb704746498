//! # judgeloops-dataset
//!
//! Records that flow between the stages and the files they live in:
//!
//! - golden set and generated answers as JSON Lines ([`read_jsonl`], [`JsonlWriter`])
//! - the human review sheet as `;`-separated CSV ([`load_review`], [`export_review_template`])
//! - golden-set sampling from the raw HotpotQA dump ([`sample_golden_set`])

mod error;
pub mod hotpot;
mod jsonl;
mod review;
mod types;

pub use error::{DatasetError, Loaded, SkippedRecord};
pub use hotpot::{load_hotpot, sample_golden_set, HotpotRecord};
pub use jsonl::{parse_jsonl, read_jsonl, write_jsonl, JsonlWriter};
pub use review::{
    export_review_template, load_review, read_review, write_review_template, ReviewSheet,
    REVIEW_HEADER,
};
pub use types::{EvalCase, GeneratedCase, HumanLabeledRow};
