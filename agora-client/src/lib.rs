mod backend;
pub use backend::Backend;

mod coordinator;
pub use coordinator::{
    CommentCoordinator, DisposeHandle, Draft, Notice, NoticeLevel, PendingDelete,
};

mod error;
pub use error::{Error, ValidationError};

mod http;
pub use http::HttpBackend;

pub mod policy;
pub use policy::{can_reply, ThreadPolicy, MAX_REPLY_DEPTH};

pub mod render;

mod session;
pub use session::Session;

pub mod thread;
pub use thread::{build_comment_tree, build_comment_tree_from_value, ThreadNode};

pub mod api {
    pub use agora_api::*;
}
