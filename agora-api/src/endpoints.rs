//! Paths of the REST endpoints, relative to the API base url

use crate::{CommentId, PostId};

pub const CURRENT_USER: &str = "/user/current-user/";

pub fn post(post: PostId) -> String {
    format!("/post/{post}/")
}

pub fn post_comments(post: PostId) -> String {
    format!("/post/{post}/comments/")
}

pub fn post_comment(post: PostId) -> String {
    format!("/post/{post}/comment/")
}

pub fn post_lock_toggle(post: PostId) -> String {
    format!("/post/{post}/lock-unlock-comment/")
}

pub fn comment_reply(comment: CommentId) -> String {
    format!("/comment/{comment}/reply/")
}

pub fn comment_detail(comment: CommentId) -> String {
    format!("/comment/{comment}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(post_comments(PostId(12)), "/post/12/comments/");
        assert_eq!(post_comment(PostId(12)), "/post/12/comment/");
        assert_eq!(comment_reply(CommentId(7)), "/comment/7/reply/");
        assert_eq!(comment_detail(CommentId(7)), "/comment/7/");
        assert_eq!(post_lock_toggle(PostId(3)), "/post/3/lock-unlock-comment/");
    }

    #[test]
    fn fuzz_ids_are_single_segments() {
        bolero::check!()
            .with_type::<(PostId, CommentId)>()
            .for_each(|&(post, comment)| {
                let p = post_comments(post);
                let segments = p.split('/').collect::<Vec<_>>();
                let id = post.0.to_string();
                assert_eq!(segments, ["", "post", id.as_str(), "comments", ""]);
                let c = comment_reply(comment);
                let segments = c.split('/').collect::<Vec<_>>();
                let id = comment.0.to_string();
                assert_eq!(segments, ["", "comment", id.as_str(), "reply", ""]);
            })
    }
}
