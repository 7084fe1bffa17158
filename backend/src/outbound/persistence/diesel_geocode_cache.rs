//! PostgreSQL-backed geocode cache adapter.
//!
//! Upserts are a single `INSERT ... ON CONFLICT (raw_address) DO UPDATE`
//! statement, so concurrent writes for one address are atomic and the last
//! writer wins.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GeocodeCache, GeocodeCacheError, GeocodeEntry};
use crate::domain::{Address, Coordinates};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_pool_error_message};
use super::models::{GeocodedAddressRow, NewGeocodedAddressRow};
use super::pool::{DbPool, PoolError};
use super::schema::geocoded_addresses;

/// Diesel-backed implementation of the geocode cache port.
#[derive(Clone)]
pub struct DieselGeocodeCache {
    pool: DbPool,
}

impl DieselGeocodeCache {
    /// Create a new cache adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GeocodeCacheError {
    GeocodeCacheError::connection(map_pool_error_message(error))
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> GeocodeCacheError {
    move |error| match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => GeocodeCacheError::connection(message),
        DieselFailure::Query(message) => GeocodeCacheError::query(message),
    }
}

/// Coordinates stored in a row, if both components are present and valid.
fn row_coordinates(row: &GeocodedAddressRow) -> Option<Coordinates> {
    let (lat, lng) = row.lat.zip(row.lng)?;
    Coordinates::new(lat, lng).ok()
}

fn row_to_entry(row: GeocodedAddressRow) -> Result<GeocodeEntry, GeocodeCacheError> {
    let coordinates = row_coordinates(&row);
    let address = Address::new(row.raw_address).map_err(|error| {
        GeocodeCacheError::query(format!("stored address is invalid: {error}"))
    })?;
    Ok(GeocodeEntry {
        address,
        coordinates,
        provider: row.provider,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl GeocodeCache for DieselGeocodeCache {
    async fn lookup(&self, address: &Address) -> Result<Option<Coordinates>, GeocodeCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GeocodedAddressRow> = geocoded_addresses::table
            .filter(geocoded_addresses::raw_address.eq(address.as_str()))
            .select(GeocodedAddressRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("geocode lookup"))?;
        Ok(row.as_ref().and_then(row_coordinates))
    }

    async fn lookup_many(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Coordinates>, GeocodeCacheError> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }
        let keys: Vec<&str> = addresses.iter().map(Address::as_str).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GeocodedAddressRow> = geocoded_addresses::table
            .filter(geocoded_addresses::raw_address.eq_any(keys))
            .filter(geocoded_addresses::lat.is_not_null())
            .filter(geocoded_addresses::lng.is_not_null())
            .select(GeocodedAddressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("geocode batch lookup"))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let coordinates = row_coordinates(&row)?;
                let address = Address::new(row.raw_address).ok()?;
                Some((address, coordinates))
            })
            .collect())
    }

    async fn upsert(
        &self,
        address: &Address,
        coordinates: Coordinates,
        provider: &str,
    ) -> Result<(), GeocodeCacheError> {
        let row = NewGeocodedAddressRow {
            raw_address: address.as_str(),
            lat: Some(coordinates.latitude()),
            lng: Some(coordinates.longitude()),
            provider,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(geocoded_addresses::table)
            .values(&row)
            .on_conflict(geocoded_addresses::raw_address)
            .do_update()
            .set((
                geocoded_addresses::lat.eq(excluded(geocoded_addresses::lat)),
                geocoded_addresses::lng.eq(excluded(geocoded_addresses::lng)),
                geocoded_addresses::provider.eq(excluded(geocoded_addresses::provider)),
                geocoded_addresses::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error("geocode upsert"))
    }

    async fn entry(&self, address: &Address) -> Result<Option<GeocodeEntry>, GeocodeCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GeocodedAddressRow> = geocoded_addresses::table
            .filter(geocoded_addresses::raw_address.eq(address.as_str()))
            .select(GeocodedAddressRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("geocode entry"))?;
        row.map(row_to_entry).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion; queries themselves need a live database.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(lat: Option<f64>, lng: Option<f64>) -> GeocodedAddressRow {
        GeocodedAddressRow {
            raw_address: "Arbat 10".to_owned(),
            lat,
            lng,
            provider: "yandex".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(55.75), None)]
    #[case(None, Some(37.59))]
    #[case(Some(155.0), Some(37.59))]
    fn incomplete_or_invalid_rows_have_no_coordinates(
        #[case] lat: Option<f64>,
        #[case] lng: Option<f64>,
    ) {
        assert_eq!(row_coordinates(&row(lat, lng)), None);
    }

    #[rstest]
    fn complete_rows_convert_to_entries() {
        let entry = row_to_entry(row(Some(55.75), Some(37.59))).expect("valid row");
        assert_eq!(entry.address.as_str(), "Arbat 10");
        assert_eq!(
            entry.coordinates,
            Some(Coordinates::new(55.75, 37.59).expect("valid"))
        );
        assert_eq!(entry.provider, "yandex");
    }

    #[rstest]
    fn blank_stored_addresses_are_rejected() {
        let mut blank = row(Some(1.0), Some(1.0));
        blank.raw_address = " ".to_owned();
        assert!(matches!(row_to_entry(blank), Err(GeocodeCacheError::Query { .. })));
    }
}
