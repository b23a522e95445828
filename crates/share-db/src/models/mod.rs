//! Database models - SQLx-compatible structs for PostgreSQL tables

mod content;

pub use content::{ContentModel, CountersModel};
