//! Driven port supplying restaurants, products, and menu availability.
//!
//! Availability is mutated independently of dispatch, so callers fetch a
//! fresh catalogue for every resolution request.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::MenuCatalog;

define_port_error! {
    /// Errors raised while reading menus.
    pub enum MenuSourceError {
        /// Menu store could not be reached.
        Connection { message: String } => "menu source connection failed: {message}",
        /// Query failed or returned malformed rows.
        Query { message: String } => "menu source query failed: {message}",
    }
}

/// Read access to the current menu catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// Load restaurants, products, and menu items as they are right now.
    async fn fetch_catalog(&self) -> Result<MenuCatalog, MenuSourceError>;
}

/// Fixture source with an empty catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureMenuSource;

#[async_trait]
impl MenuSource for FixtureMenuSource {
    async fn fetch_catalog(&self) -> Result<MenuCatalog, MenuSourceError> {
        Ok(MenuCatalog::default())
    }
}
