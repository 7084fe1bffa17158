//! Driven port supplying orders that still need dispatching.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::PendingOrder;

define_port_error! {
    /// Errors raised while reading orders.
    pub enum OrderSourceError {
        /// Order store could not be reached.
        Connection { message: String } => "order source connection failed: {message}",
        /// Query failed or returned malformed rows.
        Query { message: String } => "order source query failed: {message}",
    }
}

/// Read access to orders awaiting dispatch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// All orders whose status is not completed, with their lines.
    ///
    /// Ordering is not guaranteed; the board sorts them.
    async fn pending_orders(&self) -> Result<Vec<PendingOrder>, OrderSourceError>;
}

/// Fixture source with no orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureOrderSource;

#[async_trait]
impl OrderSource for FixtureOrderSource {
    async fn pending_orders(&self) -> Result<Vec<PendingOrder>, OrderSourceError> {
        Ok(Vec::new())
    }
}
