//! Domain entities - the core business objects.

mod post;

pub use post::{EMPTY_TAG, NewPost, POST_ID_LEN, Post, PostId, PostPatch};
