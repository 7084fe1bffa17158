//! Driven port for an external geocoding service.
//!
//! Providers make one bounded request per call and never retry. The first
//! returned candidate is authoritative.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Address, Coordinates};

/// One geocoded candidate returned by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeCandidate {
    /// Candidate position.
    pub coordinates: Coordinates,
}

define_port_error! {
    /// Errors surfaced by geocoding providers.
    pub enum GeocodingProviderError {
        /// Provider is not configured for this deployment.
        Disabled { message: String } => "geocoding provider disabled: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } => "geocoding transport failed: {message}",
        /// Request exceeded the configured timeout.
        Timeout { message: String } => "geocoding request timed out: {message}",
        /// Provider answered with a non-success status.
        Status { status: u16, message: String } =>
            "geocoding provider returned status {status}: {message}",
        /// Response body could not be turned into coordinates.
        Decode { message: String } => "geocoding response decode failed: {message}",
    }
}

impl GeocodingProviderError {
    /// Whether a response was received but could not be parsed.
    pub fn is_unparsable(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Port for turning free-text addresses into coordinates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Stable provider name recorded alongside cached coordinates.
    fn name(&self) -> &'static str;

    /// Geocode `address`, returning candidates in provider order.
    ///
    /// An empty vector means the provider found nothing.
    async fn geocode(
        &self,
        address: &Address,
    ) -> Result<Vec<GeocodeCandidate>, GeocodingProviderError>;
}

/// Provider used when no API key is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocodingProvider;

#[async_trait]
impl GeocodingProvider for DisabledGeocodingProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn geocode(
        &self,
        _address: &Address,
    ) -> Result<Vec<GeocodeCandidate>, GeocodingProviderError> {
        Err(GeocodingProviderError::disabled("no geocoder API key configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn disabled_provider_always_fails() {
        let address = Address::new("Arbat 10").expect("valid address");
        let err = DisabledGeocodingProvider
            .geocode(&address)
            .await
            .expect_err("disabled provider fails");
        assert!(matches!(err, GeocodingProviderError::Disabled { .. }));
        assert!(!err.is_unparsable());
    }

    #[rstest]
    fn status_errors_render_code_and_preview() {
        let err = GeocodingProviderError::status(403_u16, "Invalid key");
        assert_eq!(
            err.to_string(),
            "geocoding provider returned status 403: Invalid key"
        );
    }
}
