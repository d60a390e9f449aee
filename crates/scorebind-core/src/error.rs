use thiserror::Error;

/// Failure of a page-transformation run.
///
/// All variants abort the whole invocation; none of them is transient, so
/// there is no retry path inside the engine.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("page index {index} out of range (document has {page_count} pages)")]
    InvalidPageIndex { index: usize, page_count: usize },

    #[error("invalid page permutation: {0}")]
    InvalidPermutation(String),

    #[error("malformed zoom bounds: {0}")]
    MalformedBounds(String),

    #[error("document provider failed: {0}")]
    Provider(String),
}
