//! Food-delivery dispatch board: menu coverage, geocoding, and distance
//! ranking behind hexagonal ports.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
