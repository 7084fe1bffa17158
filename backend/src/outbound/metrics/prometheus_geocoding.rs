//! Prometheus adapter for geocoding lookup counters.
//!
//! One counter family, `geocoding_lookups_total`, labelled by `outcome`.
//! Cache hits and provider successes use `cache_hit` and `provider_success`;
//! degraded lookups use the failure kind label.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{GeocodeFailureKind, GeocodingMetrics, GeocodingMetricsError};

const CACHE_HIT: &str = "cache_hit";
const PROVIDER_SUCCESS: &str = "provider_success";

/// Prometheus-backed recorder for geocoding outcomes.
pub struct PrometheusGeocodingMetrics {
    lookups_total: CounterVec,
}

impl PrometheusGeocodingMetrics {
    /// Create and register counters with the provided registry.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let lookups_total = CounterVec::new(
            Opts::new("geocoding_lookups_total", "Total geocoding lookups by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(lookups_total.clone()))?;
        Ok(Self { lookups_total })
    }

    fn record(&self, outcome: &str) {
        self.lookups_total.with_label_values(&[outcome]).inc();
    }
}

#[async_trait]
impl GeocodingMetrics for PrometheusGeocodingMetrics {
    async fn record_cache_hit(&self) -> Result<(), GeocodingMetricsError> {
        self.record(CACHE_HIT);
        Ok(())
    }

    async fn record_provider_success(&self) -> Result<(), GeocodingMetricsError> {
        self.record(PROVIDER_SUCCESS);
        Ok(())
    }

    async fn record_failure(&self, kind: GeocodeFailureKind) -> Result<(), GeocodingMetricsError> {
        self.record(kind.as_label());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Counter registration and per-outcome increments.

    use super::*;
    use rstest::rstest;

    fn make_metrics() -> (Registry, PrometheusGeocodingMetrics) {
        let registry = Registry::new();
        let metrics = PrometheusGeocodingMetrics::new(&registry)
            .expect("metric registration should succeed");
        (registry, metrics)
    }

    fn count(metrics: &PrometheusGeocodingMetrics, outcome: &str) -> u64 {
        metrics.lookups_total.with_label_values(&[outcome]).get() as u64
    }

    #[test]
    fn registers_counter_family() {
        let (registry, metrics) = make_metrics();
        metrics.record(CACHE_HIT);

        assert!(
            registry
                .gather()
                .iter()
                .any(|family| family.name() == "geocoding_lookups_total"),
            "geocoding_lookups_total should be registered"
        );
    }

    #[test]
    fn double_registration_is_rejected() {
        let (registry, _metrics) = make_metrics();
        assert!(PrometheusGeocodingMetrics::new(&registry).is_err());
    }

    #[tokio::test]
    async fn hits_and_successes_use_distinct_labels() {
        let (_registry, metrics) = make_metrics();

        metrics.record_cache_hit().await.expect("record hit");
        metrics.record_cache_hit().await.expect("record hit");
        metrics
            .record_provider_success()
            .await
            .expect("record success");

        assert_eq!(count(&metrics, CACHE_HIT), 2);
        assert_eq!(count(&metrics, PROVIDER_SUCCESS), 1);
    }

    #[rstest]
    #[case(GeocodeFailureKind::EmptyAddress)]
    #[case(GeocodeFailureKind::ProviderUnavailable)]
    #[case(GeocodeFailureKind::UnparsableProviderResponse)]
    #[case(GeocodeFailureKind::NoCandidates)]
    #[case(GeocodeFailureKind::CacheUnavailable)]
    #[tokio::test]
    async fn failures_are_labelled_by_kind(#[case] kind: GeocodeFailureKind) {
        let (_registry, metrics) = make_metrics();

        metrics.record_failure(kind).await.expect("record failure");

        assert_eq!(count(&metrics, kind.as_label()), 1);
        assert_eq!(count(&metrics, CACHE_HIT), 0);
    }
}
