use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{decode_comment_list, Comment, CommentId, ImageAttachment, NewComment};

pub mod endpoints;

mod error;
pub use error::Error;

mod post;
pub use post::{Post, PostId};

mod user;
pub use user::{Role, User, UserId};

/// Storage-path fragment some image references come prefixed with
pub const IMAGE_STORAGE_PREFIX: &str = "image/upload/";

/// Turns an image reference sent by the server into a directly fetchable
/// locator
pub fn normalize_image_ref(image: &str) -> &str {
    image.strip_prefix(IMAGE_STORAGE_PREFIX).unwrap_or(image)
}

/// Returns the trimmed content, or an error if it is empty once trimmed
pub fn validate_content(content: &str) -> Result<&str, Error> {
    match content.trim() {
        "" => Err(Error::EmptyContent),
        content => Ok(content),
    }
}
