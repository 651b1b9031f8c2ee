// Submission/analysis pipeline.
// Validation gates the submission, the orchestrator drives the lifecycle,
// the client does the single outbound call and the classifier interprets it.

pub mod classifier;
pub mod client;
pub mod file_validator;
pub mod models;
pub mod orchestrator;
pub mod projection;
pub mod text_validator;
