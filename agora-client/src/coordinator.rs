use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{
    api::{self, Comment, CommentId, ImageAttachment, NewComment, Post, Time},
    policy,
    render::Rendered,
    thread::{self, ThreadNode},
    Backend, Error, Session, ThreadPolicy, ValidationError,
};

/// Content of a composer that has not been successfully submitted yet
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Draft {
    pub content: String,
    pub image: Option<ImageAttachment>,
}

impl Draft {
    pub fn new(content: &str, image: Option<ImageAttachment>) -> Draft {
        Draft {
            content: String::from(content),
            image,
        }
    }

    fn to_request(&self) -> Result<NewComment, ValidationError> {
        let content =
            api::validate_content(&self.content).map_err(|_| ValidationError::EmptyContent)?;
        Ok(NewComment {
            content: String::from(content),
            image: self.image.clone(),
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message to show the user
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Notice {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Notice {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A deletion the user still has to confirm. Dropping it cancels the
/// deletion.
#[must_use = "the comment is only deleted once the deletion is confirmed"]
#[derive(Debug, Eq, PartialEq)]
pub struct PendingDelete {
    comment: CommentId,
}

impl PendingDelete {
    pub fn comment(&self) -> CommentId {
        self.comment
    }
}

/// Marks a thread as closed. Responses arriving afterwards are discarded.
#[derive(Clone, Debug, Default)]
pub struct DisposeHandle(Arc<AtomicBool>);

impl DisposeHandle {
    pub fn dispose(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Comment thread of one post.
///
/// Every successful mutation is followed by a full re-fetch of the post's
/// comments and a rebuild of the reply forest; the forest is never patched
/// in place. Failures are logged and turned into a `Notice`, and the draft
/// that was being submitted is kept so the user can retry.
pub struct CommentCoordinator<B> {
    session: Session<B>,
    post: Post,
    policy: ThreadPolicy,

    comments: Vec<Comment>,
    forest: Vec<ThreadNode>,

    comment_draft: Draft,
    reply: Option<(CommentId, Draft)>,
    edits: HashMap<CommentId, Draft>,

    notices: Vec<Notice>,
    count_listener: Option<Box<dyn FnMut(usize) + Send>>,
    disposed: DisposeHandle,
}

impl<B: Backend> CommentCoordinator<B> {
    /// Does not fetch anything, call `load` to populate the thread
    pub fn new(session: Session<B>, post: Post) -> CommentCoordinator<B> {
        CommentCoordinator {
            session,
            post,
            policy: ThreadPolicy::default(),
            comments: Vec::new(),
            forest: Vec::new(),
            comment_draft: Draft::default(),
            reply: None,
            edits: HashMap::new(),
            notices: Vec::new(),
            count_listener: None,
            disposed: DisposeHandle::default(),
        }
    }

    pub fn with_policy(mut self, policy: ThreadPolicy) -> CommentCoordinator<B> {
        self.policy = policy;
        self
    }

    /// Called with the post's comment count after each successful mutation
    pub fn on_count_changed(&mut self, listener: impl FnMut(usize) + Send + 'static) {
        self.count_listener = Some(Box::new(listener));
    }

    pub fn dispose_handle(&self) -> DisposeHandle {
        self.disposed.clone()
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn policy(&self) -> &ThreadPolicy {
        &self.policy
    }

    /// Flat comments, as last fetched
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn forest(&self) -> &[ThreadNode] {
        &self.forest
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn comment_draft(&self) -> &Draft {
        &self.comment_draft
    }

    pub fn reply_target(&self) -> Option<CommentId> {
        self.reply.as_ref().map(|(parent, _)| *parent)
    }

    pub fn reply_draft(&self) -> Option<&Draft> {
        self.reply.as_ref().map(|(_, draft)| draft)
    }

    pub fn edit_draft(&self, comment: CommentId) -> Option<&Draft> {
        self.edits.get(&comment)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn render(&self, now: Time) -> Rendered<'_> {
        Rendered::new(&self.forest, self.policy, self.post.lock_comment, now)
    }

    pub fn composer_offered(&self) -> bool {
        !self.post.lock_comment
    }

    pub fn reply_offered(&self, depth: usize) -> bool {
        self.policy.reply_offered(&self.post, depth)
    }

    pub fn can_edit(&self, comment: &Comment) -> bool {
        policy::can_edit(&self.session.user, comment)
    }

    pub fn can_delete(&self, comment: &Comment) -> bool {
        policy::can_delete(&self.session.user, &self.post, comment)
    }

    pub fn can_toggle_lock(&self) -> bool {
        policy::can_toggle_lock(&self.session.user, &self.post)
    }

    /// Fetches the post's comments and rebuilds the forest, returning the
    /// comment count
    pub async fn load(&mut self) -> Result<usize, Error> {
        let res = self.session.backend.fetch_comments(self.post.id).await;
        self.ensure_live()?;
        match res {
            Ok(comments) => {
                self.forest = thread::build_comment_tree(&comments);
                self.comments = comments;
                Ok(self.comments.len())
            }
            Err(e) => Err(self.fail("loading comments", e)),
        }
    }

    pub async fn add_comment(
        &mut self,
        content: &str,
        image: Option<ImageAttachment>,
    ) -> Result<usize, Error> {
        self.comment_draft = Draft::new(content, image);
        if self.post.lock_comment {
            return Err(ValidationError::CommentsLocked.into());
        }
        let req = self.comment_draft.to_request()?;
        let res = self
            .session
            .backend
            .create_comment(self.post.id, req)
            .await;
        self.settle("commenting on the post", res)?;
        self.comment_draft = Draft::default();
        self.reload_after_mutation().await
    }

    /// Opens the reply composer under `parent`, discarding any previous reply
    /// draft
    pub fn start_reply(&mut self, parent: CommentId) -> Result<(), Error> {
        self.check_reply(parent)?;
        self.reply = Some((parent, Draft::default()));
        Ok(())
    }

    pub fn cancel_reply(&mut self) {
        self.reply = None;
    }

    pub async fn add_reply(
        &mut self,
        parent: CommentId,
        content: &str,
        image: Option<ImageAttachment>,
    ) -> Result<usize, Error> {
        let draft = Draft::new(content, image);
        let req = draft.to_request();
        self.reply = Some((parent, draft));
        self.check_reply(parent)?;
        let req = req?;
        let res = self.session.backend.create_reply(parent, req).await;
        self.settle("replying to the comment", res)?;
        self.reply = None;
        self.reload_after_mutation().await
    }

    /// Replaces a comment's content. When `image` is None the current image
    /// is left untouched.
    pub async fn edit_comment(
        &mut self,
        comment: CommentId,
        content: &str,
        image: Option<ImageAttachment>,
    ) -> Result<usize, Error> {
        let target = self.find_comment(comment)?;
        if !policy::can_edit(&self.session.user, target) {
            return Err(ValidationError::PermissionDenied.into());
        }
        let draft = Draft::new(content, image);
        let req = draft.to_request();
        self.edits.insert(comment, draft);
        let req = req?;
        let res = self.session.backend.edit_comment(comment, req).await;
        self.settle("editing the comment", res)?;
        self.edits.remove(&comment);
        self.reload_after_mutation().await
    }

    /// First step of a deletion; nothing is sent until `confirm_delete`
    pub fn request_delete(&self, comment: CommentId) -> Result<PendingDelete, Error> {
        let target = self.find_comment(comment)?;
        if !policy::can_delete(&self.session.user, &self.post, target) {
            return Err(ValidationError::PermissionDenied.into());
        }
        Ok(PendingDelete { comment })
    }

    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> Result<usize, Error> {
        let comment = pending.comment;
        let res = self.session.backend.delete_comment(comment).await;
        self.settle("deleting the comment", res)?;
        self.edits.remove(&comment);
        if self.reply_target() == Some(comment) {
            self.reply = None;
        }
        self.notices.push(Notice::info("Comment deleted."));
        self.reload_after_mutation().await
    }

    /// Locks or unlocks commenting on the post, returning whether it is now
    /// locked
    pub async fn toggle_comment_lock(&mut self) -> Result<bool, Error> {
        if !self.can_toggle_lock() {
            return Err(ValidationError::PermissionDenied.into());
        }
        let res = self
            .session
            .backend
            .toggle_comment_lock(self.post.id)
            .await;
        self.settle("toggling the comment lock", res)?;
        self.post.lock_comment = !self.post.lock_comment;
        if self.post.lock_comment {
            self.reply = None;
        }
        tracing::info!(
            post = %self.post.id,
            locked = self.post.lock_comment,
            "toggled comment lock"
        );
        Ok(self.post.lock_comment)
    }

    fn find_comment(&self, comment: CommentId) -> Result<&Comment, ValidationError> {
        self.comments
            .iter()
            .find(|c| c.id == comment)
            .ok_or(ValidationError::UnknownComment(comment))
    }

    fn check_reply(&self, parent: CommentId) -> Result<(), ValidationError> {
        if self.post.lock_comment {
            return Err(ValidationError::CommentsLocked);
        }
        let (depth, _) = thread::find(&self.forest, parent)
            .ok_or(ValidationError::UnknownComment(parent))?;
        if !self.policy.can_reply(depth) {
            return Err(ValidationError::ReplyTooDeep { depth });
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), Error> {
        match self.disposed.is_disposed() {
            true => Err(Error::Disposed),
            false => Ok(()),
        }
    }

    /// Handles the outcome of a mutation request
    fn settle(&mut self, action: &str, res: Result<(), Error>) -> Result<(), Error> {
        self.ensure_live()?;
        match res {
            // retrying the same input would fail the same way
            Err(e) if e.is_validation() => {
                tracing::debug!(post = %self.post.id, %e, "refused {action}");
                Err(e)
            }
            res => res.map_err(|e| self.fail(action, e)),
        }
    }

    fn fail(&mut self, action: &str, err: Error) -> Error {
        tracing::error!(post = %self.post.id, %err, "failed {action}");
        self.notices
            .push(Notice::error(format!("Failed {action}, please try again.")));
        err
    }

    async fn reload_after_mutation(&mut self) -> Result<usize, Error> {
        let count = self.load().await?;
        tracing::info!(post = %self.post.id, count, "comment thread reloaded");
        if let Some(listener) = &mut self.count_listener {
            listener(count);
        }
        Ok(count)
    }
}
