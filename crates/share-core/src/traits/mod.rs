//! Ports implemented by the infrastructure crates

mod cache;
mod repositories;

pub use cache::DiscoveryCache;
pub use repositories::{
    ContentRepository, CounterRepository, LikeRepository, RepoResult, ViewRepository,
};
