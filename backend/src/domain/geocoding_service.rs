//! Cache-first geocoding with graceful degradation.
//!
//! The service consults the [`GeocodeCache`] before calling the external
//! [`GeocodingProvider`]. Provider calls are single, bounded by a timeout,
//! and never retried. Every failure is absorbed into a [`GeocodeOutcome`]
//! and reported to the [`GeocodingMetrics`] hook instead of propagating.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{StreamExt, stream};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ports::{
    GeocodeCache, GeocodeFailureKind, GeocodingMetrics, GeocodingProvider, GeocodingProviderError,
};
use super::{Address, Coordinates};

/// Default bound on one provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);
/// Default number of provider calls in flight during batch resolution.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Why a lookup could not produce fresh coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {detail}", .kind.as_label())]
pub struct GeocodeFailure {
    kind: GeocodeFailureKind,
    detail: String,
}

impl GeocodeFailure {
    /// Build a failure of `kind` with a human-readable detail.
    pub fn new(kind: GeocodeFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Failure category.
    pub fn kind(&self) -> GeocodeFailureKind {
        self.kind
    }

    /// Diagnostic detail.
    pub fn detail(&self) -> &str {
        self.detail.as_str()
    }
}

/// Result of resolving one address.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    /// Coordinates were already cached.
    Cached(Coordinates),
    /// Coordinates were fetched from the provider and cached.
    Fetched(Coordinates),
    /// Resolution failed; `fallback` holds whatever the cache had.
    Degraded {
        /// Last known cached coordinates, usually `None`.
        fallback: Option<Coordinates>,
        /// Reason for the degradation.
        failure: GeocodeFailure,
    },
}

impl GeocodeOutcome {
    /// Best available coordinates.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Cached(coordinates) | Self::Fetched(coordinates) => Some(*coordinates),
            Self::Degraded { fallback, .. } => *fallback,
        }
    }

    /// Failure details for degraded outcomes.
    pub fn failure(&self) -> Option<&GeocodeFailure> {
        match self {
            Self::Degraded { failure, .. } => Some(failure),
            Self::Cached(_) | Self::Fetched(_) => None,
        }
    }
}

/// Orchestrates cache lookups and provider fetches.
#[derive(Clone)]
pub struct GeocodingService {
    cache: Arc<dyn GeocodeCache>,
    provider: Arc<dyn GeocodingProvider>,
    metrics: Arc<dyn GeocodingMetrics>,
    provider_timeout: Duration,
    max_concurrency: usize,
}

impl GeocodingService {
    /// Create a service with default timeout and concurrency.
    pub fn new(
        cache: Arc<dyn GeocodeCache>,
        provider: Arc<dyn GeocodingProvider>,
        metrics: Arc<dyn GeocodingMetrics>,
    ) -> Self {
        Self {
            cache,
            provider,
            metrics,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Override the per-call provider timeout.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Override the number of concurrent provider calls in a batch.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Resolve one raw address.
    ///
    /// Blank input short-circuits without touching the cache or provider.
    pub async fn resolve(&self, raw_address: &str) -> GeocodeOutcome {
        let Ok(address) = Address::new(raw_address) else {
            return self.empty_address(raw_address).await;
        };

        match self.cache.lookup(&address).await {
            Ok(Some(coordinates)) => {
                debug!(address = %address, "geocode cache hit");
                let _ = self.metrics.record_cache_hit().await;
                return GeocodeOutcome::Cached(coordinates);
            }
            Ok(None) => {}
            Err(error) => self.cache_unavailable(&address, &error.to_string()).await,
        }

        self.fetch(&address).await
    }

    /// Resolve many addresses, calling the provider only for cache misses.
    ///
    /// Duplicate addresses are resolved once. The returned map is keyed by
    /// the raw input text.
    pub async fn resolve_batch<I, S>(&self, raw_addresses: I) -> HashMap<String, GeocodeOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = raw_addresses.into_iter().map(Into::into).collect();
        let mut outcomes = HashMap::with_capacity(distinct.len());
        let mut addresses = Vec::with_capacity(distinct.len());

        for raw in distinct {
            match Address::new(raw.as_str()) {
                Ok(address) => addresses.push(address),
                Err(_) => {
                    let outcome = self.empty_address(&raw).await;
                    outcomes.insert(raw, outcome);
                }
            }
        }
        if addresses.is_empty() {
            return outcomes;
        }

        let cached = match self.cache.lookup_many(&addresses).await {
            Ok(found) => found,
            Err(error) => {
                warn!(
                    error = %error,
                    count = addresses.len(),
                    "geocode cache batch lookup failed; fetching every address"
                );
                let _ = self
                    .metrics
                    .record_failure(GeocodeFailureKind::CacheUnavailable)
                    .await;
                HashMap::new()
            }
        };

        let mut misses = Vec::new();
        for address in addresses {
            match cached.get(&address) {
                Some(coordinates) => {
                    let _ = self.metrics.record_cache_hit().await;
                    outcomes.insert(address.into(), GeocodeOutcome::Cached(*coordinates));
                }
                None => misses.push(address),
            }
        }
        debug!(
            hits = outcomes.len(),
            misses = misses.len(),
            "geocode batch cache pass complete"
        );

        let fetched: Vec<(Address, GeocodeOutcome)> = stream::iter(misses)
            .map(|address| async move {
                let outcome = self.fetch(&address).await;
                (address, outcome)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;
        outcomes.extend(
            fetched
                .into_iter()
                .map(|(address, outcome)| (String::from(address), outcome)),
        );
        outcomes
    }

    async fn fetch(&self, address: &Address) -> GeocodeOutcome {
        info!(address = %address, provider = self.provider.name(), "fetching coordinates");
        let response = tokio::time::timeout(self.provider_timeout, self.provider.geocode(address))
            .await
            .unwrap_or_else(|_| {
                Err(GeocodingProviderError::timeout(format!(
                    "no response within {}ms",
                    self.provider_timeout.as_millis()
                )))
            });

        let failure = match response {
            Ok(candidates) => match candidates.first() {
                Some(candidate) => {
                    let coordinates = candidate.coordinates;
                    if let Err(error) = self
                        .cache
                        .upsert(address, coordinates, self.provider.name())
                        .await
                    {
                        self.cache_unavailable(address, &error.to_string()).await;
                    }
                    let _ = self.metrics.record_provider_success().await;
                    return GeocodeOutcome::Fetched(coordinates);
                }
                None => GeocodeFailure::new(
                    GeocodeFailureKind::NoCandidates,
                    "provider returned no candidates",
                ),
            },
            Err(error) if error.is_unparsable() => {
                GeocodeFailure::new(GeocodeFailureKind::UnparsableProviderResponse, error.to_string())
            }
            Err(error) => {
                GeocodeFailure::new(GeocodeFailureKind::ProviderUnavailable, error.to_string())
            }
        };

        self.degrade(address, failure).await
    }

    async fn degrade(&self, address: &Address, failure: GeocodeFailure) -> GeocodeOutcome {
        let fallback = self.cache.lookup(address).await.ok().flatten();
        warn!(
            address = %address,
            reason = failure.kind().as_label(),
            detail = failure.detail(),
            has_fallback = fallback.is_some(),
            "geocoding degraded"
        );
        let _ = self.metrics.record_failure(failure.kind()).await;
        GeocodeOutcome::Degraded { fallback, failure }
    }

    async fn empty_address(&self, raw_address: &str) -> GeocodeOutcome {
        warn!(
            address = raw_address,
            reason = GeocodeFailureKind::EmptyAddress.as_label(),
            "geocoding skipped"
        );
        let _ = self
            .metrics
            .record_failure(GeocodeFailureKind::EmptyAddress)
            .await;
        GeocodeOutcome::Degraded {
            fallback: None,
            failure: GeocodeFailure::new(GeocodeFailureKind::EmptyAddress, "address is blank"),
        }
    }

    async fn cache_unavailable(&self, address: &Address, detail: &str) {
        warn!(
            address = %address,
            reason = GeocodeFailureKind::CacheUnavailable.as_label(),
            detail,
            "geocode cache unavailable"
        );
        let _ = self
            .metrics
            .record_failure(GeocodeFailureKind::CacheUnavailable)
            .await;
    }
}

#[cfg(test)]
#[path = "geocoding_service_tests.rs"]
mod tests;
