use crate::{
    api::{PostId, User},
    Backend, CommentCoordinator, Error,
};

/// Who is using the client, and how to reach the server on their behalf
#[derive(Clone, Debug)]
pub struct Session<B> {
    pub backend: B,
    pub user: User,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B, user: User) -> Session<B> {
        Session { backend, user }
    }

    /// Resolves the user the backend is authenticated as
    pub async fn connect(backend: B) -> Result<Session<B>, Error> {
        let user = backend.current_user().await?;
        tracing::debug!(user = %user.id, "connected");
        Ok(Session { backend, user })
    }

    /// Fetches a post and its comments
    pub async fn open_thread(self, post: PostId) -> Result<CommentCoordinator<B>, Error> {
        let post = self.backend.fetch_post(post).await?;
        let mut thread = CommentCoordinator::new(self, post);
        thread.load().await?;
        Ok(thread)
    }
}
