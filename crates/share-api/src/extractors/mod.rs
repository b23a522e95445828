//! Axum extractors for request handling
//!
//! Authentication, viewer identity signals, path ids, and validated input.

mod auth;
mod path;
mod validated;
mod viewer;

pub use auth::{AuthUser, OptionalAuthUser};
pub use path::ContentIdPath;
pub use validated::{ValidatedJson, ValidatedQuery};
pub use viewer::{ViewerSignals, FORWARDED_FOR_HEADER, REAL_IP_HEADER, SESSION_COOKIE, SESSION_HEADER};
