//! Building a golden set from the HotpotQA dev split.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::{DatasetError, EvalCase};

/// Only questions at this difficulty make it into the golden set
pub const HARD_LEVEL: &str = "hard";

/// One entry of the raw HotpotQA JSON array
#[derive(Debug, Clone, Deserialize)]
pub struct HotpotRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub level: String,
    /// `[[title, [sentence, ...]], ...]`
    #[serde(default)]
    pub context: Vec<Value>,
}

/// Load the raw dataset (a single JSON array)
pub fn load_hotpot(path: &Path) -> Result<Vec<HotpotRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Turn the nested context array into `Document [title]: sentences` lines.
/// Entries that don't have a string title and a sentence list are dropped.
pub fn flatten_context(context: &[Value]) -> String {
    let mut flat = String::new();

    for doc in context {
        let Some(parts) = doc.as_array() else {
            continue;
        };
        let (Some(title), Some(sentences)) = (
            parts.first().and_then(Value::as_str),
            parts.get(1).and_then(Value::as_array),
        ) else {
            continue;
        };

        flat.push_str(&format!("Document [{}]: ", title));
        for sentence in sentences.iter().filter_map(Value::as_str) {
            flat.push_str(sentence);
        }
        flat.push('\n');
    }

    flat
}

/// Full generator prompt for one question
pub fn build_prompt(record: &HotpotRecord) -> String {
    format!(
        "Context:\n{}\n\nQuestion: {}",
        flatten_context(&record.context),
        record.question
    )
}

/// Pick up to `limit` random hard questions and turn them into eval cases
pub fn sample_golden_set<R: Rng + ?Sized>(
    records: Vec<HotpotRecord>,
    limit: usize,
    rng: &mut R,
) -> Vec<EvalCase> {
    let mut hard: Vec<HotpotRecord> = records
        .into_iter()
        .filter(|r| r.level == HARD_LEVEL)
        .collect();

    hard.shuffle(rng);
    hard.truncate(limit);

    hard.iter()
        .map(|record| EvalCase {
            id: record.id.clone(),
            prompt: build_prompt(record),
            reference: record.answer.clone(),
        })
        .collect()
}
