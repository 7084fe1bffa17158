//! Scripted geocoding provider and recording metrics hook.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{
    GeocodeCandidate, GeocodeFailureKind, GeocodingMetrics, GeocodingMetricsError,
    GeocodingProvider, GeocodingProviderError,
};
use crate::domain::{Address, Coordinates};

type ScriptedResponse = Result<Vec<GeocodeCandidate>, GeocodingProviderError>;

/// Provider answering from a fixed script and counting calls per address.
///
/// Addresses without a scripted response resolve to an empty candidate list.
#[derive(Default)]
pub struct ScriptedGeocodingProvider {
    responses: HashMap<String, ScriptedResponse>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedGeocodingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `address` with a single candidate.
    pub fn with_point(self, address: &str, latitude: f64, longitude: f64) -> Self {
        let coordinates = match Coordinates::new(latitude, longitude) {
            Ok(coordinates) => coordinates,
            Err(error) => panic!("scripted coordinates for {address}: {error}"),
        };
        self.with_response(address, Ok(vec![GeocodeCandidate { coordinates }]))
    }

    /// Answer `address` with an arbitrary response.
    pub fn with_response(mut self, address: &str, response: ScriptedResponse) -> Self {
        self.responses.insert(address.to_owned(), response);
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of provider calls made for `address`.
    pub fn calls_for(&self, address: &str) -> usize {
        self.lock_calls().get(address).copied().unwrap_or(0)
    }

    /// Number of provider calls made overall.
    pub fn total_calls(&self) -> usize {
        self.lock_calls().values().sum()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        match self.calls.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("scripted provider mutex"),
        }
    }
}

#[async_trait]
impl GeocodingProvider for ScriptedGeocodingProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn geocode(&self, address: &Address) -> ScriptedResponse {
        *self
            .lock_calls()
            .entry(address.as_str().to_owned())
            .or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .get(address.as_str())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Metrics hook that remembers every recorded outcome.
#[derive(Default)]
pub struct RecordingGeocodingMetrics {
    cache_hits: Mutex<usize>,
    provider_successes: Mutex<usize>,
    failures: Mutex<Vec<GeocodeFailureKind>>,
}

impl RecordingGeocodingMetrics {
    pub fn cache_hits(&self) -> usize {
        *lock(&self.cache_hits)
    }

    pub fn provider_successes(&self) -> usize {
        *lock(&self.provider_successes)
    }

    pub fn failures(&self) -> Vec<GeocodeFailureKind> {
        lock(&self.failures).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("recording metrics mutex"),
    }
}

#[async_trait]
impl GeocodingMetrics for RecordingGeocodingMetrics {
    async fn record_cache_hit(&self) -> Result<(), GeocodingMetricsError> {
        *lock(&self.cache_hits) += 1;
        Ok(())
    }

    async fn record_provider_success(&self) -> Result<(), GeocodingMetricsError> {
        *lock(&self.provider_successes) += 1;
        Ok(())
    }

    async fn record_failure(&self, kind: GeocodeFailureKind) -> Result<(), GeocodingMetricsError> {
        lock(&self.failures).push(kind);
        Ok(())
    }
}
