//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod geocode_cache;
mod geocoding_metrics;
mod geocoding_provider;
mod menu_source;
mod order_source;

#[cfg(test)]
pub use geocode_cache::MockGeocodeCache;
pub use geocode_cache::{FixtureGeocodeCache, GeocodeCache, GeocodeCacheError, GeocodeEntry};
#[cfg(test)]
pub use geocoding_metrics::MockGeocodingMetrics;
pub use geocoding_metrics::{
    GeocodeFailureKind, GeocodingMetrics, GeocodingMetricsError, NoOpGeocodingMetrics,
};
#[cfg(test)]
pub use geocoding_provider::MockGeocodingProvider;
pub use geocoding_provider::{
    DisabledGeocodingProvider, GeocodeCandidate, GeocodingProvider, GeocodingProviderError,
};
#[cfg(test)]
pub use menu_source::MockMenuSource;
pub use menu_source::{FixtureMenuSource, MenuSource, MenuSourceError};
#[cfg(test)]
pub use order_source::MockOrderSource;
pub use order_source::{FixtureOrderSource, OrderSource, OrderSourceError};

#[cfg(test)]
mod tests;
