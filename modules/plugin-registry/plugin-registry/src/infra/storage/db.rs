//! Database error conversion helpers.

use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Convert a backend error into a `DomainError::Database`.
pub fn db_err(e: DbErr) -> DomainError {
    DomainError::database(e.to_string())
}

pub fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Map an insert failure: a unique-key violation is a domain conflict,
/// anything else a database error.
pub fn insert_err(e: DbErr, conflict_message: &'static str) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::conflict(conflict_message)
    } else {
        db_err(e)
    }
}

/// Map an update failure: an untouched row means the record is gone.
pub fn update_err(e: DbErr, entity: &'static str, id: Uuid) -> DomainError {
    match e {
        DbErr::RecordNotUpdated => DomainError::not_found(entity, id),
        other => db_err(other),
    }
}
