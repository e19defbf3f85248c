//! Post id guard.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use std::future::{Ready, ready};

use quire_core::domain::PostId;

use super::error::AppError;

/// Path parameter holding a post id.
pub const ID_PARAM: &str = "id";

/// Extractor that checks the `{id}` path segment before the handler runs.
///
/// Place it first in a handler's arguments: a malformed id is rejected with
/// `400` and an empty body, and nothing after it (body parsing, store calls)
/// is attempted.
#[derive(Debug, Clone)]
pub struct ValidPostId(pub PostId);

impl FromRequest for ValidPostId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let raw = req.match_info().get(ID_PARAM).unwrap_or_default();

        ready(PostId::parse(raw).map(ValidPostId).map_err(|e| {
            tracing::debug!(post_id = raw, "Rejected malformed post id");
            AppError::from(e)
        }))
    }
}
