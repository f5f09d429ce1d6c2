use crate::api::{Comment, Post, User};

/// Replies can be made to comments strictly shallower than this
pub const MAX_REPLY_DEPTH: usize = 3;

/// Whether a comment at `depth` (roots are at 0) may receive replies
pub fn can_reply(depth: usize) -> bool {
    depth < MAX_REPLY_DEPTH
}

/// Only the author may edit a comment
pub fn can_edit(viewer: &User, comment: &Comment) -> bool {
    viewer.id == comment.user.id
}

/// Admins, the post's author and the comment's author may delete a comment
pub fn can_delete(viewer: &User, post: &Post, comment: &Comment) -> bool {
    viewer.is_admin() || viewer.id == post.user.id || viewer.id == comment.user.id
}

pub fn can_toggle_lock(viewer: &User, post: &Post) -> bool {
    viewer.is_admin() || viewer.id == post.user.id
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ThreadPolicy {
    pub max_reply_depth: usize,
}

impl Default for ThreadPolicy {
    fn default() -> ThreadPolicy {
        ThreadPolicy {
            max_reply_depth: MAX_REPLY_DEPTH,
        }
    }
}

impl ThreadPolicy {
    pub fn can_reply(&self, depth: usize) -> bool {
        depth < self.max_reply_depth
    }

    /// Whether the reply action is shown on a comment at `depth` of `post`
    pub fn reply_offered(&self, post: &Post, depth: usize) -> bool {
        !post.lock_comment && self.can_reply(depth)
    }
}
