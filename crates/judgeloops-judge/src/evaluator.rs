use judgeloops_provider::{Provider, ProviderError};
use tracing::debug;

use crate::{JudgePrompts, PromptStyle, Verdict};

/// Inputs required to judge one answer.
#[derive(Clone, Copy)]
pub struct JudgeEvaluationInput<'a> {
    pub reference: &'a str,
    pub system_answer: &'a str,
}

/// A verdict together with the text it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub verdict: Verdict,
    pub raw_output: String,
}

/// Evaluator that runs the judge provider once
pub struct JudgeEvaluator<'a> {
    provider: &'a dyn Provider,
    style: PromptStyle,
}

impl<'a> JudgeEvaluator<'a> {
    pub fn new(provider: &'a dyn Provider, style: PromptStyle) -> Self {
        Self { provider, style }
    }

    pub async fn evaluate(
        &self,
        input: JudgeEvaluationInput<'_>,
    ) -> Result<Judgement, ProviderError> {
        let prompt = JudgePrompts::build(self.style, input.reference, input.system_answer);

        debug!(
            provider = self.provider.name(),
            prompt_len = prompt.len(),
            style = ?self.style,
            "Running judge"
        );

        let raw_output = self.provider.generate(&prompt).await?;

        Ok(Judgement {
            verdict: Verdict::parse(&raw_output),
            raw_output,
        })
    }
}
