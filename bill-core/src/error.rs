//! Error types of the public API.

use thiserror::Error;

/// Failure while producing an export artifact. The message is for logs;
/// users only see a generic notice.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(String),

    #[error("export failed: {0}")]
    Failed(String),
}

/// Invalid request for the current session phase.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot generate a bill for an order without items")]
    EmptyOrder,

    #[error("the bill has been generated; start a new order to make changes")]
    BillFinalized,

    #[error("no bill has been generated yet")]
    NotReviewing,

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Failure loading a shop profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid profile: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid UTC offset: {0} minutes")]
    Offset(i32),
}
