//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **cache**: in-process geocode cache
//! - **persistence**: PostgreSQL-backed cache and sources using Diesel ORM
//! - **yandex**: HTTP geocoding provider
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//! - **tracing_metrics**: log-backed metrics hook
//!
//! Adapters translate between domain types and infrastructure-specific
//! representations. They contain no business logic.

pub mod cache;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod tracing_metrics;
pub mod yandex;
