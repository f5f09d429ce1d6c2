use async_trait::async_trait;

use crate::{
    api::{Comment, CommentId, NewComment, Post, PostId, User},
    Error,
};

/// The REST endpoints the comment thread talks to
#[async_trait]
pub trait Backend: Send + Sync {
    async fn current_user(&self) -> Result<User, Error>;
    async fn fetch_post(&self, post: PostId) -> Result<Post, Error>;
    async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, Error>;
    async fn create_comment(&self, post: PostId, comment: NewComment) -> Result<(), Error>;
    async fn create_reply(&self, parent: CommentId, comment: NewComment) -> Result<(), Error>;
    async fn edit_comment(&self, comment: CommentId, edit: NewComment) -> Result<(), Error>;
    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error>;
    async fn toggle_comment_lock(&self, post: PostId) -> Result<(), Error>;
}
