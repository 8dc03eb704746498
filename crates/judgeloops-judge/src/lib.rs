mod evaluator;
mod prompts;
mod verdict;

pub use evaluator::{JudgeEvaluationInput, JudgeEvaluator, Judgement};
pub use prompts::{JudgePrompts, PromptStyle};
pub use verdict::Verdict;
