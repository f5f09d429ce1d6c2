use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found")]
    NotFound,

    #[error("Comments are locked on this post")]
    CommentsLocked,

    #[error("Comment content is empty")]
    EmptyContent,
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::CommentsLocked => StatusCode::FORBIDDEN,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::NotFound => json!({
                "message": "not found",
                "type": "not-found",
            }),
            Error::CommentsLocked => json!({
                "message": "comments are locked on this post",
                "type": "comments-locked",
            }),
            Error::EmptyContent => json!({
                "message": "comment content must not be empty",
                "type": "empty-content",
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "not-found" => Error::NotFound,
                "comments-locked" => Error::CommentsLocked,
                "empty-content" => Error::EmptyContent,
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }

    /// Like `parse`, but bodies that are not ours (eg. a proxy's HTML page)
    /// become `Unknown` carrying the raw text
    pub fn parse_lossy(body: &[u8]) -> Error {
        Error::parse(body)
            .unwrap_or_else(|_| Error::Unknown(String::from_utf8_lossy(body).into_owned()))
    }
}
