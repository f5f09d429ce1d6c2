use std::collections::{BTreeMap, HashMap, HashSet};

use agora_api::{
    Comment, CommentId, Error, Post, PostId, Role, User, UserId, IMAGE_STORAGE_PREFIX,
};
use chrono::Utc;

mod error;
mod extractors;
mod handlers;
pub use handlers::{router, SharedServer};

/// In-memory stand-in for the REST API
pub struct MockServer {
    users: BTreeMap<UserId, User>,
    sessions: HashMap<String, UserId>,
    posts: BTreeMap<PostId, Post>,
    /// All comments of all posts, in creation order
    comments: Vec<(PostId, Comment)>,
    next_id: i64,
}

/// Accounts and content created by `MockServer::seed_demo`
#[derive(Debug)]
pub struct Demo {
    /// (username, token) pairs
    pub sessions: Vec<(String, String)>,
    pub post: PostId,
}

impl Default for MockServer {
    fn default() -> Self {
        MockServer::new()
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            sessions: HashMap::new(),
            posts: BTreeMap::new(),
            comments: Vec::new(),
            next_id: 1,
        }
    }

    fn fresh_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn create_user(&mut self, username: &str, first: &str, last: &str, role: Role) -> User {
        let id = UserId(self.fresh_id());
        let user = User {
            id,
            username: String::from(username),
            first_name: String::from(first),
            last_name: String::from(last),
            avatar: Some(format!("{IMAGE_STORAGE_PREFIX}avatars/{username}.png")),
            role,
        };
        self.users.insert(id, user.clone());
        user
    }

    pub fn open_session(&mut self, user: UserId) -> Result<String, Error> {
        if !self.users.contains_key(&user) {
            return Err(Error::NotFound);
        }
        let token = format!("token-{}-{}", user, self.fresh_id());
        self.sessions.insert(token.clone(), user);
        Ok(token)
    }

    pub fn create_post(&mut self, author: UserId, content: &str) -> Result<Post, Error> {
        let user = self.users.get(&author).ok_or(Error::NotFound)?.clone();
        let post = Post {
            id: PostId(self.fresh_id()),
            content: String::from(content),
            lock_comment: false,
            user,
            created_date: Utc::now(),
        };
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    fn resolve(&self, token: &str) -> Result<&User, Error> {
        self.sessions
            .get(token)
            .and_then(|id| self.users.get(id))
            .ok_or(Error::PermissionDenied)
    }

    fn comment(&self, id: CommentId) -> Result<&(PostId, Comment), Error> {
        self.comments
            .iter()
            .find(|(_, c)| c.id == id)
            .ok_or(Error::NotFound)
    }

    pub fn current_user(&self, token: &str) -> Result<User, Error> {
        self.resolve(token).cloned()
    }

    pub fn post(&self, post: PostId) -> Result<Post, Error> {
        self.posts.get(&post).cloned().ok_or(Error::NotFound)
    }

    /// Anyone may list comments, authenticated or not
    pub fn comments(&self, post: PostId) -> Result<Vec<Comment>, Error> {
        if !self.posts.contains_key(&post) {
            return Err(Error::NotFound);
        }
        Ok(self
            .comments
            .iter()
            .filter(|(p, _)| *p == post)
            .map(|(_, c)| c.clone())
            .collect())
    }

    fn insert_comment(
        &mut self,
        token: &str,
        post: PostId,
        parent: Option<CommentId>,
        content: &str,
        image: Option<&str>,
    ) -> Result<Comment, Error> {
        let user = self.resolve(token)?.clone();
        let content = agora_api::validate_content(content)?;
        if self.posts.get(&post).ok_or(Error::NotFound)?.lock_comment {
            return Err(Error::CommentsLocked);
        }
        let now = Utc::now();
        let comment = Comment {
            id: CommentId(self.fresh_id()),
            content: String::from(content),
            image: image.map(|name| format!("{IMAGE_STORAGE_PREFIX}{name}")),
            parent,
            user,
            created_date: now,
            updated_date: Some(now),
        };
        self.comments.push((post, comment.clone()));
        Ok(comment)
    }

    pub fn add_comment(
        &mut self,
        token: &str,
        post: PostId,
        content: &str,
        image: Option<&str>,
    ) -> Result<Comment, Error> {
        self.insert_comment(token, post, None, content, image)
    }

    pub fn reply(
        &mut self,
        token: &str,
        parent: CommentId,
        content: &str,
        image: Option<&str>,
    ) -> Result<Comment, Error> {
        let post = self.comment(parent)?.0;
        self.insert_comment(token, post, Some(parent), content, image)
    }

    /// Only the author may edit. Without a new image, the old one is kept.
    pub fn edit_comment(
        &mut self,
        token: &str,
        comment: CommentId,
        content: &str,
        image: Option<&str>,
    ) -> Result<Comment, Error> {
        let user = self.resolve(token)?.id;
        let content = String::from(agora_api::validate_content(content)?);
        let (_, target) = self
            .comments
            .iter_mut()
            .find(|(_, c)| c.id == comment)
            .ok_or(Error::NotFound)?;
        if target.user.id != user {
            return Err(Error::PermissionDenied);
        }
        target.content = content;
        if let Some(name) = image {
            target.image = Some(format!("{IMAGE_STORAGE_PREFIX}{name}"));
        }
        target.updated_date = Some(Utc::now());
        Ok(target.clone())
    }

    /// Deletes a comment along with all of its replies
    pub fn delete_comment(&mut self, token: &str, comment: CommentId) -> Result<(), Error> {
        let user = self.resolve(token)?.clone();
        let (post, target) = self.comment(comment)?;
        let post_author = self.posts.get(post).map(|p| p.user.id);
        if !user.is_admin() && user.id != target.user.id && Some(user.id) != post_author {
            return Err(Error::PermissionDenied);
        }

        // replies are always created after their parent
        let mut doomed = HashSet::new();
        doomed.insert(comment);
        for (_, c) in &self.comments {
            if c.parent.map_or(false, |p| doomed.contains(&p)) {
                doomed.insert(c.id);
            }
        }
        self.comments.retain(|(_, c)| !doomed.contains(&c.id));
        tracing::debug!(%comment, removed = doomed.len(), "deleted comment");
        Ok(())
    }

    pub fn toggle_comment_lock(&mut self, token: &str, post: PostId) -> Result<Post, Error> {
        let user = self.resolve(token)?.clone();
        let target = self.posts.get_mut(&post).ok_or(Error::NotFound)?;
        if !user.is_admin() && user.id != target.user.id {
            return Err(Error::PermissionDenied);
        }
        target.lock_comment = !target.lock_comment;
        Ok(target.clone())
    }

    /// Populates the server with a few users, a post and a short thread
    pub fn seed_demo(&mut self) -> Result<Demo, Error> {
        let admin = self.create_user("admin", "", "", Role::Admin);
        let alice = self.create_user("alice", "Alice", "Nguyen", Role::Alumni);
        let bob = self.create_user("bob", "Bob", "Tran", Role::Teacher);

        let mut sessions = Vec::new();
        for u in [&admin, &alice, &bob] {
            sessions.push((u.username.clone(), self.open_session(u.id)?));
        }
        let (alice_tok, bob_tok) = (sessions[1].1.clone(), sessions[2].1.clone());

        let post = self.create_post(bob.id, "Reunion next month, who's coming?")?;
        let first = self.add_comment(&alice_tok, post.id, "Count me in!", None)?;
        let answer = self.reply(&bob_tok, first.id, "Great, see you there.", None)?;
        self.reply(&alice_tok, answer.id, "Should I bring anything?", None)?;
        self.add_comment(&bob_tok, post.id, "Venue photo", Some("venue.jpg"))?;

        Ok(Demo {
            sessions,
            post: post.id,
        })
    }
}
