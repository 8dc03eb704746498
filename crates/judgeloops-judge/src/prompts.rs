/// Which judge prompt to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Used by the judging pipeline
    Grading,
    /// Stricter wording used when calibrating against human labels
    Alignment,
}

/// Prompt templates for the judge
pub struct JudgePrompts;

impl JudgePrompts {
    pub fn build(style: PromptStyle, reference: &str, system_answer: &str) -> String {
        match style {
            PromptStyle::Grading => Self::build_grading_prompt(reference, system_answer),
            PromptStyle::Alignment => Self::build_alignment_prompt(reference, system_answer),
        }
    }

    /// Build the prompt used when scoring a generated answer
    pub fn build_grading_prompt(reference: &str, system_answer: &str) -> String {
        format!(
            r#"
You are a strict factual judge.
Reference Answer: "{reference}"
Student Answer: "{answer}"

Does the Student Answer contain the core fact from the Reference Answer?
Reply ONLY with "1" for Yes or "0" for No.
"#,
            reference = reference,
            answer = system_answer,
        )
    }

    /// Build the prompt used when comparing the judge against human labels
    pub fn build_alignment_prompt(reference: &str, system_answer: &str) -> String {
        format!(
            r#"
You are a strict factual judge.
Reference Answer: "{reference}"
Student Answer: "{answer}"

Does the Student Answer contain the core fact from the Reference Answer?
Ignore minor phrasing differences.
If the reference is a date or name, it MUST be present.
Reply ONLY with "1" for Yes or "0" for No. Don't add explanations.
"#,
            reference = reference,
            answer = system_answer,
        )
    }
}
