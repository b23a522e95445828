//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in share-core.

mod content;
mod counter;
mod error;
mod like;
mod view;

pub use content::PgContentRepository;
pub use counter::PgCounterRepository;
pub use like::PgLikeRepository;
pub use view::PgViewRepository;
