use judgeloops_judge::Verdict;
use serde::{Deserialize, Serialize};

/// A single evaluation scenario from the golden set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCase {
    pub id: String,
    /// Full text sent to the generator, context included
    pub prompt: String,
    /// Ground-truth answer
    pub reference: String,
}

/// An eval case together with the answer the generator produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCase {
    #[serde(flatten)]
    pub case: EvalCase,
    pub system_answer: String,
}

impl GeneratedCase {
    pub fn new(case: EvalCase, system_answer: String) -> Self {
        Self {
            case,
            system_answer,
        }
    }

    pub fn id(&self) -> &str {
        &self.case.id
    }

    pub fn reference(&self) -> &str {
        &self.case.reference
    }
}

/// One row of the human review sheet that carries a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanLabeledRow {
    pub id: String,
    pub reference: String,
    pub system_answer: String,
    /// Reviewer's call: `Pass` for "1" (correct), `Fail` for "0"
    pub human_label: Verdict,
    pub notes: Option<String>,
}
