//! Observability hook for geocoding outcomes.
//!
//! The geocoding service reports every lookup here instead of printing
//! diagnostics. Exporter failures are ignored by callers.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording geocoding metrics.
    pub enum GeocodingMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "geocoding metrics exporter failed: {message}",
    }
}

/// Reason a lookup degraded instead of returning fresh coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum GeocodeFailureKind {
    /// Address text was blank.
    EmptyAddress,
    /// Provider was unreachable, timed out, disabled, or answered non-2xx.
    ProviderUnavailable,
    /// Provider answered but coordinates could not be extracted.
    UnparsableProviderResponse,
    /// Provider answered with an empty result set.
    NoCandidates,
    /// Cache could not be read or written.
    CacheUnavailable,
}

impl GeocodeFailureKind {
    /// Stable label used by metrics and logs.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::EmptyAddress => "empty_address",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::UnparsableProviderResponse => "unparsable_provider_response",
            Self::NoCandidates => "no_candidates",
            Self::CacheUnavailable => "cache_unavailable",
        }
    }
}

/// Metrics recording port for geocoding lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingMetrics: Send + Sync {
    /// Record a lookup answered from the cache.
    async fn record_cache_hit(&self) -> Result<(), GeocodingMetricsError>;

    /// Record a lookup answered by the provider.
    async fn record_provider_success(&self) -> Result<(), GeocodingMetricsError>;

    /// Record a degraded lookup.
    async fn record_failure(&self, kind: GeocodeFailureKind) -> Result<(), GeocodingMetricsError>;
}

/// No-op implementation used when metrics are disabled or in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpGeocodingMetrics;

#[async_trait]
impl GeocodingMetrics for NoOpGeocodingMetrics {
    async fn record_cache_hit(&self) -> Result<(), GeocodingMetricsError> {
        Ok(())
    }

    async fn record_provider_success(&self) -> Result<(), GeocodingMetricsError> {
        Ok(())
    }

    async fn record_failure(&self, _kind: GeocodeFailureKind) -> Result<(), GeocodingMetricsError> {
        Ok(())
    }
}
