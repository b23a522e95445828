//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of a
//! call and owns no state of its own.

pub mod content;
pub mod context;
pub mod counter;
pub mod discovery;
pub mod error;
pub mod like;
pub mod reconciler;
pub mod view;

pub use content::ContentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use counter::CounterService;
pub use discovery::DiscoveryService;
pub use error::{ServiceError, ServiceResult};
pub use like::LikeService;
pub use reconciler::{run_once, spawn_reconciler, MaintenancePass};
pub use view::ViewService;
