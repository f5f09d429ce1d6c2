use bolero::generator::TypeGenerator;
use std::fmt;

use crate::{Time, User};

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A comment as the server lists it: flat, with an optional parent pointer
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,

    /// Attached media reference, possibly carrying the storage prefix
    #[serde(default)]
    pub image: Option<String>,

    /// None for comments attached directly to the post
    #[serde(default)]
    pub parent: Option<CommentId>,

    pub user: User,
    pub created_date: Time,

    #[serde(default)]
    pub updated_date: Option<Time>,
}

impl Comment {
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_deref().map(crate::normalize_image_ref)
    }
}

/// Image picked on the client side, sent as the `image` multipart field
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub fn jpeg(file_name: impl Into<String>, data: Vec<u8>) -> ImageAttachment {
        ImageAttachment {
            file_name: file_name.into(),
            content_type: String::from("image/jpeg"),
            data,
        }
    }
}

/// Body of a comment creation, reply or edit request
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewComment {
    pub content: String,
    pub image: Option<ImageAttachment>,
}

impl NewComment {
    /// Trims the content, refusing it if nothing is left
    pub fn new(content: &str, image: Option<ImageAttachment>) -> Result<NewComment, crate::Error> {
        let content = crate::validate_content(content)?;
        Ok(NewComment {
            content: String::from(content),
            image,
        })
    }
}

/// Decodes the body of `GET /post/{id}/comments/`.
///
/// Anything that is not a JSON array is taken to mean "no comments", while an
/// array with malformed elements is an error.
pub fn decode_comment_list(body: serde_json::Value) -> serde_json::Result<Vec<Comment>> {
    match body {
        serde_json::Value::Array(_) => serde_json::from_value(body),
        _ => Ok(Vec::new()),
    }
}
