use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Binary reading of a judge's free-text output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Judge said the answer holds the reference fact ("1")
    Pass,
    /// Anything else ("0")
    Fail,
}

impl Verdict {
    /// Parse a verdict from raw judge output.
    ///
    /// Any occurrence of the character `1` counts as a pass, so `"10"` and
    /// `"I'd say 1 probably"` both pass. Numeric references that contain a
    /// `1` can be misread by this rule; it is kept as-is so scores stay
    /// comparable with earlier runs.
    pub fn parse(judge_output: &str) -> Self {
        let verdict = if judge_output.contains('1') {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        trace!(output_len = judge_output.len(), verdict = %verdict, "Parsed verdict");
        verdict
    }

    /// Parse a human label ("1" or "0", surrounding whitespace ignored)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "1" => Some(Verdict::Pass),
            "0" => Some(Verdict::Fail),
            _ => None,
        }
    }

    /// The "1"/"0" form used in prompts, CSV files and reports
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "1",
            Verdict::Fail => "0",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
