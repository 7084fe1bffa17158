//! Fixture behaviour and error helpers shared by the port surface.
use super::*;
use crate::domain::{Address, Coordinates};
use rstest::{fixture, rstest};

#[fixture]
fn arbat() -> Address {
    Address::new("Arbat 10").expect("valid address")
}

#[rstest]
#[tokio::test]
async fn fixture_cache_never_remembers(arbat: Address) {
    let cache = FixtureGeocodeCache;
    let point = Coordinates::new(55.75, 37.59).expect("valid coordinates");
    cache
        .upsert(&arbat, point, "fixture")
        .await
        .expect("fixture upsert succeeds");

    assert_eq!(cache.lookup(&arbat).await.expect("lookup"), None);
    assert!(cache
        .lookup_many(std::slice::from_ref(&arbat))
        .await
        .expect("lookup_many")
        .is_empty());
    assert!(cache.entry(&arbat).await.expect("entry").is_none());
}

#[rstest]
#[tokio::test]
async fn fixture_sources_are_empty() {
    assert!(FixtureOrderSource
        .pending_orders()
        .await
        .expect("orders")
        .is_empty());
    let catalog = FixtureMenuSource.fetch_catalog().await.expect("catalog");
    assert!(catalog.restaurants.is_empty());
    assert!(catalog.menu_items.is_empty());
}

#[rstest]
#[tokio::test]
async fn no_op_metrics_accept_every_outcome() {
    let metrics = NoOpGeocodingMetrics;
    assert!(metrics.record_cache_hit().await.is_ok());
    assert!(metrics.record_provider_success().await.is_ok());
    assert!(metrics
        .record_failure(GeocodeFailureKind::NoCandidates)
        .await
        .is_ok());
}

#[rstest]
#[case(GeocodeFailureKind::EmptyAddress, "empty_address")]
#[case(GeocodeFailureKind::ProviderUnavailable, "provider_unavailable")]
#[case(GeocodeFailureKind::UnparsableProviderResponse, "unparsable_provider_response")]
#[case(GeocodeFailureKind::NoCandidates, "no_candidates")]
#[case(GeocodeFailureKind::CacheUnavailable, "cache_unavailable")]
fn failure_kinds_have_stable_labels(#[case] kind: GeocodeFailureKind, #[case] label: &str) {
    assert_eq!(kind.as_label(), label);
}

#[rstest]
fn source_errors_format_messages() {
    assert_eq!(
        OrderSourceError::connection("pool exhausted").to_string(),
        "order source connection failed: pool exhausted"
    );
    assert_eq!(
        MenuSourceError::query("bad row").to_string(),
        "menu source query failed: bad row"
    );
    assert_eq!(
        GeocodeCacheError::query("deadlock").to_string(),
        "geocode cache query failed: deadlock"
    );
}
