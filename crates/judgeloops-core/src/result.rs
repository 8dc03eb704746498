use judgeloops_judge::Verdict;
use serde::{Deserialize, Serialize};

/// How judging a single case ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeOutcome {
    Passed,
    Failed,
    /// The judge itself never produced an answer
    Errored,
}

/// The judge's result for one generated case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    pub id: String,
    pub outcome: JudgeOutcome,
    /// Raw judge output, or the error when the judge could not be reached
    pub reason: Option<String>,
}

impl EvalResult {
    pub fn judged(id: String, verdict: Verdict, raw_output: String) -> Self {
        let outcome = if verdict.is_pass() {
            JudgeOutcome::Passed
        } else {
            JudgeOutcome::Failed
        };
        Self {
            id,
            outcome,
            reason: Some(raw_output),
        }
    }

    pub fn errored(id: String, error: String) -> Self {
        Self {
            id,
            outcome: JudgeOutcome::Errored,
            reason: Some(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == JudgeOutcome::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judged_maps_verdict() {
        let pass = EvalResult::judged("a".into(), Verdict::Pass, "1".into());
        let fail = EvalResult::judged("b".into(), Verdict::Fail, "0".into());
        assert!(pass.passed());
        assert_eq!(fail.outcome, JudgeOutcome::Failed);
        assert!(!fail.passed());
    }

    #[test]
    fn test_errored_is_neither_pass_nor_fail() {
        let result = EvalResult::errored("c".into(), "timed out".into());
        assert!(!result.passed());
        assert_eq!(result.outcome, JudgeOutcome::Errored);
        assert_eq!(result.reason.as_deref(), Some("timed out"));
    }
}
