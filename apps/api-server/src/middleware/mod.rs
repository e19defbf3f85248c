//! Middleware modules.

pub mod error;
pub mod post_id;
