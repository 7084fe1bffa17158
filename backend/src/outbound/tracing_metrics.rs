//! Geocoding metrics hook that writes structured log events.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{GeocodeFailureKind, GeocodingMetrics, GeocodingMetricsError};

/// Emits one `tracing` event per recorded geocoding outcome.
///
/// Used by the CLI when the `metrics` feature is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingGeocodingMetrics;

#[async_trait]
impl GeocodingMetrics for TracingGeocodingMetrics {
    async fn record_cache_hit(&self) -> Result<(), GeocodingMetricsError> {
        debug!(outcome = "cache_hit", "geocoding lookup");
        Ok(())
    }

    async fn record_provider_success(&self) -> Result<(), GeocodingMetricsError> {
        debug!(outcome = "provider_success", "geocoding lookup");
        Ok(())
    }

    async fn record_failure(&self, kind: GeocodeFailureKind) -> Result<(), GeocodingMetricsError> {
        info!(outcome = kind.as_label(), "geocoding lookup degraded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GeocodeFailureKind::NoCandidates)]
    #[case(GeocodeFailureKind::CacheUnavailable)]
    #[tokio::test]
    async fn recording_never_fails(#[case] kind: GeocodeFailureKind) {
        let metrics = TracingGeocodingMetrics;
        assert!(metrics.record_cache_hit().await.is_ok());
        assert!(metrics.record_provider_success().await.is_ok());
        assert!(metrics.record_failure(kind).await.is_ok());
    }
}
