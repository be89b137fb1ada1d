use thiserror::Error;

/// Errors from the key/value persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by cosmetic collaborators. Never propagated past the
/// event dispatcher.
#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("feedback unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
