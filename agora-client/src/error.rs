use crate::api::{self, CommentId};

/// Reasons an action is refused before anything is sent to the server
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("comment content is empty")]
    EmptyContent,

    #[error("comments are locked on this post")]
    CommentsLocked,

    #[error("comments at depth {depth} cannot receive replies")]
    ReplyTooDeep { depth: usize },

    #[error("comment {0} is not part of this thread")]
    UnknownComment(CommentId),

    #[error("permission denied")]
    PermissionDenied,

    #[error("unsupported image type {0:?}")]
    InvalidImageType(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request failed: {0:#}")]
    Network(anyhow::Error),

    #[error("server answered with status {status}: {error}")]
    Server { status: u16, error: api::Error },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("the thread was closed before the response arrived")]
    Disposed,
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Network(e.into())
    }
}
