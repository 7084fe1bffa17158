//! Port for the durable address → coordinates cache.
//!
//! The raw address text is the natural key: one entry per address, written
//! only through the geocoding service and never expired or deleted.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::{Address, Coordinates};

/// One cached geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeEntry {
    /// Raw address used as the cache key.
    pub address: Address,
    /// Resolved coordinates; `None` for rows created without a result.
    pub coordinates: Option<Coordinates>,
    /// Provider that produced the coordinates.
    pub provider: String,
    /// When the entry was first stored.
    pub created_at: DateTime<Utc>,
    /// When the entry was last overwritten.
    pub updated_at: DateTime<Utc>,
}

define_port_error! {
    /// Errors raised by geocode cache adapters.
    pub enum GeocodeCacheError {
        /// Backing store could not be reached.
        Connection { message: String } => "geocode cache connection failed: {message}",
        /// Query or write failed during execution.
        Query { message: String } => "geocode cache query failed: {message}",
    }
}

/// Durable cache of geocoded addresses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodeCache: Send + Sync {
    /// Resolved coordinates for an exact address match.
    ///
    /// Entries without coordinates are reported as `None`.
    async fn lookup(&self, address: &Address) -> Result<Option<Coordinates>, GeocodeCacheError>;

    /// Resolved coordinates for every address that has them.
    ///
    /// Addresses that are missing or unresolved are absent from the map.
    async fn lookup_many(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Coordinates>, GeocodeCacheError>;

    /// Insert or overwrite the entry for `address`, refreshing `updated_at`.
    async fn upsert(
        &self,
        address: &Address,
        coordinates: Coordinates,
        provider: &str,
    ) -> Result<(), GeocodeCacheError>;

    /// Full cache entry for diagnostics.
    async fn entry(&self, address: &Address) -> Result<Option<GeocodeEntry>, GeocodeCacheError>;
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureGeocodeCache;

#[async_trait]
impl GeocodeCache for FixtureGeocodeCache {
    async fn lookup(&self, _address: &Address) -> Result<Option<Coordinates>, GeocodeCacheError> {
        Ok(None)
    }

    async fn lookup_many(
        &self,
        _addresses: &[Address],
    ) -> Result<HashMap<Address, Coordinates>, GeocodeCacheError> {
        Ok(HashMap::new())
    }

    async fn upsert(
        &self,
        _address: &Address,
        _coordinates: Coordinates,
        _provider: &str,
    ) -> Result<(), GeocodeCacheError> {
        Ok(())
    }

    async fn entry(&self, _address: &Address) -> Result<Option<GeocodeEntry>, GeocodeCacheError> {
        Ok(None)
    }
}
