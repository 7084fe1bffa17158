//! Shared error helpers for the Diesel adapters.
//!
//! Each adapter maps into its own port error, so these helpers only
//! classify failures and extract messages.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classified Diesel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection(String),
    /// Any other query failure.
    Query(String),
}

/// Classify a Diesel error and emit debug context.
pub fn classify_diesel_error(error: DieselError, operation: &str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(%error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection(format!("{operation}: database connection closed"))
        }
        DieselError::NotFound => DieselFailure::Query(format!("{operation}: record not found")),
        other => DieselFailure::Query(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify_diesel_error(DieselError::NotFound, "load orders"),
            DieselFailure::Query("load orders: record not found".to_owned())
        );
    }

    #[rstest]
    fn pool_messages_are_unwrapped() {
        assert_eq!(map_pool_error_message(PoolError::checkout("timed out")), "timed out");
    }
}
