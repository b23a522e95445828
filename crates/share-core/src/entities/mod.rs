//! Domain entities - content records, engagement facts, and discovery selections

mod content;
mod counters;
mod discovery;
mod like;
mod view;

pub use content::{Content, ContentStatus};
pub use counters::{CounterDelta, CounterDrift, CounterField, Counters, Reconciliation};
pub use discovery::{
    CategoryScope, ContentSummary, DiscoveryKey, DiscoverySelection, DISCOVERY_KEY_PREFIX,
};
pub use like::{LikeOutcome, LikeRecord};
pub use view::{ViewOutcome, ViewRecord};
