//! Observability module - request ids and tracing spans.

mod request_id;

pub use request_id::RequestIdMiddleware;
