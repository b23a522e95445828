//! Error handling utilities for repositories

use share_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
///
/// Anything not mapped to a domain outcome means the store could not serve
/// the request.
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::StoreUnavailable(e.to_string())
}

/// Map a foreign-key violation to the not-found error of the missing parent
///
/// `on_fk` receives the violated constraint name and returns the error for
/// it, or `None` to fall back to [`map_db_error`].
pub fn map_fk_violation<F>(e: SqlxError, on_fk: F) -> DomainError
where
    F: FnOnce(&str) -> Option<DomainError>,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            if let Some(mapped) = on_fk(db_err.constraint().unwrap_or_default()) {
                return mapped;
            }
        }
    }
    map_db_error(e)
}
