// CV optimization: multipart upload → generator → partition → rendered PDF + evaluation.
// All generator calls go through the ResumeGenerator trait in llm_client.

pub mod handlers;
pub mod partition;
pub mod prompts;
pub mod upload;
