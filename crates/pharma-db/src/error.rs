//! # Database Error Types
//!
//! The error every operation returns, and the kind a caller branches on.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError / CoreError (pharma-core)   SQLite error (sqlx::Error) │
//! │       │                                            │                    │
//! │       └──────────────────┬─────────────────────────┘                    │
//! │                          ▼                                              │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorKind: VALIDATION | DUPLICATE | NOT_FOUND | CONFLICT | STORAGE    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorReport { kind, message } → presentation layer                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pharma_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before reaching storage.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Adding a medicine with a barcode already in use
    /// - Changing a barcode to one held by another medicine
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Not enough stock for the requested sale.
    #[error("Insufficient stock for medicine {medicine_id}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine_id: i64,
        available: i64,
        requested: i64,
    },

    /// Deletion blocked by dependent rows (restrict policy).
    #[error("{entity} {id} is still referenced by {references} sale(s)")]
    StillReferenced {
        entity: String,
        id: i64,
        references: i64,
    },

    /// The medicine's price is zero; a sale must carry a positive total.
    #[error("Medicine {medicine_id} has no price and cannot be sold")]
    Unpriced { medicine_id: i64 },

    /// Foreign key constraint violation reported by SQLite.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK / NOT NULL constraint violation reported by SQLite.
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (acquire timed out).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// What went wrong, at the granularity a caller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Uniqueness conflict.
    Duplicate,
    /// Referenced id does not exist.
    NotFound,
    /// Referential restriction or business-rule conflict.
    Conflict,
    /// The data store itself failed.
    Storage,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Validation(_) | DbError::ConstraintViolation { .. } => ErrorKind::Validation,
            DbError::UniqueViolation { .. } => ErrorKind::Duplicate,
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::InsufficientStock { .. }
            | DbError::StillReferenced { .. }
            | DbError::Unpriced { .. }
            | DbError::ForeignKeyViolation { .. } => ErrorKind::Conflict,
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorKind::Storage,
        }
    }

    /// Builds the report shown to the user.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Serializable error shape for the presentation layer.
///
/// ```json
/// { "kind": "CONFLICT", "message": "Insufficient stock for medicine 1: available 2, requested 3" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DbError> for ErrorReport {
    fn from(err: &DbError) -> Self {
        err.report()
    }
}

/// Business rule failures keep their meaning at the operation boundary.
impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                medicine_id,
                available,
                requested,
            } => DbError::InsufficientStock {
                medicine_id,
                available,
                requested,
            },
            CoreError::Unpriced { medicine_id } => DbError::Unpriced { medicine_id },
            CoreError::Validation(e) => DbError::Validation(e),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>" / "NOT NULL constraint failed: ..."
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed")
                    || msg.contains("NOT NULL constraint failed")
                {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let validation: DbError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(DbError::duplicate("barcode", "1234").kind(), ErrorKind::Duplicate);
        assert_eq!(DbError::not_found("Medicine", 3).kind(), ErrorKind::NotFound);
        assert_eq!(
            DbError::StillReferenced {
                entity: "Medicine".to_string(),
                id: 3,
                references: 2
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(DbError::PoolExhausted.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_core_error_conversion() {
        let err: DbError = CoreError::InsufficientStock {
            medicine_id: 1,
            available: 2,
            requested: 3,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for medicine 1: available 2, requested 3"
        );

        let err: DbError = CoreError::Unpriced { medicine_id: 4 }.into();
        assert!(matches!(err, DbError::Unpriced { medicine_id: 4 }));
    }

    #[test]
    fn test_report_serialization() {
        let report = DbError::not_found("Customer", 9).report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "NOT_FOUND");
        assert_eq!(json["message"], "Customer not found: 9");
    }
}
