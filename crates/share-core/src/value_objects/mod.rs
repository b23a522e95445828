//! Value objects - immutable types that represent domain concepts

mod dedup_policy;
mod snowflake;

pub use dedup_policy::ViewDedupPolicy;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
