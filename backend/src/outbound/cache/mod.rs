//! In-process geocode cache adapter.
//!
//! Backs the `GeocodeCache` port with a `RwLock<HashMap>` keyed by the raw
//! address. Used by the CLI when no database is configured and by tests.
//! Each upsert holds the write lock for one map update, so concurrent writes
//! to the same address resolve as last-write-wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{GeocodeCache, GeocodeCacheError, GeocodeEntry};
use crate::domain::{Address, Coordinates};

/// Geocode cache kept in process memory.
pub struct InMemoryGeocodeCache {
    entries: RwLock<HashMap<Address, GeocodeEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryGeocodeCache {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryGeocodeCache {
    /// Create an empty cache stamping entries with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Insert an entry as-is, including unresolved rows.
    pub fn seed(&self, entry: GeocodeEntry) -> Result<(), GeocodeCacheError> {
        let mut entries = self.write()?;
        entries.insert(entry.address.clone(), entry);
        Ok(())
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns a connection error when the lock is poisoned.
    pub fn len(&self) -> Result<usize, GeocodeCacheError> {
        Ok(self.read()?.len())
    }

    /// Whether the cache holds no entries.
    ///
    /// # Errors
    ///
    /// Returns a connection error when the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, GeocodeCacheError> {
        Ok(self.read()?.is_empty())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Address, GeocodeEntry>>, GeocodeCacheError>
    {
        self.entries
            .read()
            .map_err(|_| GeocodeCacheError::connection("in-memory cache lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<Address, GeocodeEntry>>, GeocodeCacheError>
    {
        self.entries
            .write()
            .map_err(|_| GeocodeCacheError::connection("in-memory cache lock poisoned"))
    }
}

#[async_trait]
impl GeocodeCache for InMemoryGeocodeCache {
    async fn lookup(&self, address: &Address) -> Result<Option<Coordinates>, GeocodeCacheError> {
        Ok(self
            .read()?
            .get(address)
            .and_then(|entry| entry.coordinates))
    }

    async fn lookup_many(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Coordinates>, GeocodeCacheError> {
        let entries = self.read()?;
        Ok(addresses
            .iter()
            .filter_map(|address| {
                entries
                    .get(address)
                    .and_then(|entry| entry.coordinates)
                    .map(|coordinates| (address.clone(), coordinates))
            })
            .collect())
    }

    async fn upsert(
        &self,
        address: &Address,
        coordinates: Coordinates,
        provider: &str,
    ) -> Result<(), GeocodeCacheError> {
        let now = self.clock.utc();
        let mut entries = self.write()?;
        entries
            .entry(address.clone())
            .and_modify(|entry| {
                entry.coordinates = Some(coordinates);
                provider.clone_into(&mut entry.provider);
                entry.updated_at = now;
            })
            .or_insert_with(|| GeocodeEntry {
                address: address.clone(),
                coordinates: Some(coordinates),
                provider: provider.to_owned(),
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }

    async fn entry(&self, address: &Address) -> Result<Option<GeocodeEntry>, GeocodeCacheError> {
        Ok(self.read()?.get(address).cloned())
    }
}
