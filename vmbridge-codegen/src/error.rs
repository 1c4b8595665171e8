use thiserror::Error;

/// Fatal generation errors.
///
/// Everything else the pipeline encounters is recorded as a
/// [`Diagnostic`](crate::pipeline::Diagnostic) and generation continues.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// No declaration qualifies as the root view model.
    #[error("configuration error: {0}")]
    Configuration(String),
}
