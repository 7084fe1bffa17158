//! Test utilities for the backend crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests or with the `test-support` feature.

pub mod clock;
pub mod geocoding;
pub mod sources;

pub use clock::MutableClock;
pub use geocoding::{RecordingGeocodingMetrics, ScriptedGeocodingProvider};
pub use sources::{StaticMenuSource, StaticOrderSource, order_with_products, restaurant};
