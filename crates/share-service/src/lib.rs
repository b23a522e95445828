//! # share-service
//!
//! Application layer for engagement and discovery: view counting, like
//! toggling, counter reconciliation, and cached random discovery.

pub mod dto;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use services::{
    ContentService, CounterService, DiscoveryService, LikeService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, ViewService,
};
