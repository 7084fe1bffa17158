//! Yandex geocoder outbound adapter.
//!
//! A thin HTTP implementation of the `GeocodingProvider` port.

mod dto;
mod http_provider;

pub use http_provider::{DEFAULT_YANDEX_ENDPOINT, YandexGeocoder};
