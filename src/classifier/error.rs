use thiserror::Error;

/// Typed failure of a classification service call or a rejected submission.
///
/// Display is the bare message so it can be shown to the user as-is.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Input rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),
    /// Service unreachable or health check failed; recover by re-checking.
    #[error("{0}")]
    Connection(String),
    /// Predict answered with an error payload or a non-2xx status.
    #[error("{0}")]
    Prediction(String),
    /// Network, HTTP status or decoding failure on any call.
    #[error("{0}")]
    Transport(String),
    /// The service has no history entry with this id.
    #[error("History entry {0} not found")]
    NotFound(u64),
}

/// Category of a [`ClientError`], without its message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Connection,
    Prediction,
    Transport,
    NotFound,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Prediction(_) => ErrorKind::Prediction,
            Self::Transport(_) => ErrorKind::Transport,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
