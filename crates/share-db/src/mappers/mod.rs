//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: convert database rows to domain objects
//! - `*Insert` structs: prepare entity data for database writes

mod content;
mod engagement;

pub use content::ContentInsert;
pub use engagement::{LikeInsert, ViewInsert};
