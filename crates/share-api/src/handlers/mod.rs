//! Route handlers

pub mod contents;
pub mod discover;
pub mod health;
