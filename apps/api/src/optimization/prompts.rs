//! LLM prompt constants for CV optimization.
//!
//! The prompt asks the model to open the evaluation part with the configured marker as a
//! title; `partition` relies on that marker to tell the rewritten CV from the evaluation.

pub const DEFAULT_JOB_DESCRIPTION: &str = "Optimize this CV for general use.";

pub const OPTIMIZE_PROMPT_TEMPLATE: &str = "\
You are a CV optimization assistant. Improve the CV based on this job description:\n\
{job_description}\n\
\n\
Update the CV to match the job description requirements.\n\
Write the key skills required, suggested changes, missing skills, and hiring chance assessment.\n\
Please provide recommendations for improving the CV.\n\
When you finish with the content of the resume and move on to give me the rest of the data \
I requested, start with the title: {marker}.\n\
Attached is the PDF CV.";

/// Fills the optimize prompt with the job description and the evaluation marker.
pub fn build_optimize_prompt(job_description: &str, marker: &str) -> String {
    OPTIMIZE_PROMPT_TEMPLATE
        .replace("{marker}", marker)
        .replace("{job_description}", job_description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_job_description_and_marker() {
        let prompt = build_optimize_prompt("Senior Rust Engineer", "###EVAL###");
        assert!(prompt.contains("job description:\nSenior Rust Engineer\n"));
        assert!(prompt.contains("start with the title: ###EVAL###."));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_job_description_placeholders_are_not_expanded() {
        // The marker is substituted first, so a job text containing "{marker}" stays literal.
        let prompt = build_optimize_prompt("Use {marker} syntax", "###EVAL###");
        assert!(prompt.contains("Use {marker} syntax"));
    }
}
