//! Dispatcher board CLI: pending orders, capable restaurants, and distances.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use foodcart_backend::config::DispatchSettings;
use foodcart_backend::domain::ports::{
    DisabledGeocodingProvider, GeocodeCache, GeocodingMetrics, GeocodingProvider, MenuSource,
};
use foodcart_backend::domain::{
    CoverageRule, DispatchBoardService, GeocodeOutcome, GeocodingService, MenuCoverageResolver,
    availability_matrix,
};
use foodcart_backend::outbound::cache::InMemoryGeocodeCache;
use foodcart_backend::outbound::persistence::{
    DbPool, DieselGeocodeCache, DieselMenuSource, DieselOrderSource, PoolConfig,
};
use foodcart_backend::outbound::yandex::YandexGeocoder;
use ortho_config::OrthoConfig;
use serde_json::json;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `dispatch-board` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dispatch-board",
    about = "Show pending orders with the restaurants able to cook them, nearest first",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `FOODCART_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    /// Coverage rule override: `subset` or `exact`.
    #[arg(long = "coverage-rule", value_name = "rule", global = true, value_parser = parse_rule)]
    coverage_rule: Option<CoverageRule>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print the dispatcher board as JSON.
    Board,
    /// Resolve one address and print the outcome.
    Geocode {
        /// Free-form postal address.
        address: String,
    },
    /// Print the product availability matrix as JSON.
    Availability,
}

fn parse_rule(raw: &str) -> Result<CoverageRule, String> {
    raw.parse().map_err(|error| format!("{error}"))
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = DispatchSettings::load_from_iter([OsString::from("dispatch-board")])
        .map_err(|error| io::Error::other(format!("load configuration: {error}")))?;
    let database_url = args
        .database_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .or_else(|| settings.database_url().map(str::to_owned));
    let rule = match args.coverage_rule {
        Some(rule) => rule,
        None => settings
            .coverage_rule()
            .map_err(|error| invalid_input(format!("FOODCART_COVERAGE_RULE: {error}")))?,
    };

    let pool = match database_url {
        Some(url) => Some(
            DbPool::new(PoolConfig::new(&url))
                .await
                .map_err(|error| io::Error::other(format!("create database pool: {error}")))?,
        ),
        None => None,
    };

    let metrics = MetricsHandle::new()?;
    let result = run(args.command, &settings, pool, rule, &metrics).await;
    metrics.report();
    result
}

async fn run(
    command: Command,
    settings: &DispatchSettings,
    pool: Option<DbPool>,
    rule: CoverageRule,
    metrics: &MetricsHandle,
) -> io::Result<()> {
    match command {
        Command::Board => {
            let pool = require_pool(pool)?;
            let geocoding = geocoding_service(settings, Some(&pool), metrics.recorder())?;
            let service = DispatchBoardService::new(
                Arc::new(DieselOrderSource::new(pool.clone())),
                Arc::new(DieselMenuSource::new(pool)),
                geocoding,
                MenuCoverageResolver::new(rule),
            );
            let board = service
                .build_board()
                .await
                .map_err(|error| io::Error::other(format!("build board: {error}")))?;
            print_json(&board)
        }
        Command::Geocode { address } => {
            let geocoding = geocoding_service(settings, pool.as_ref(), metrics.recorder())?;
            let outcome = geocoding.resolve(&address).await;
            print_json(&outcome_json(&address, &outcome))
        }
        Command::Availability => {
            let pool = require_pool(pool)?;
            let catalog = DieselMenuSource::new(pool)
                .fetch_catalog()
                .await
                .map_err(|error| io::Error::other(format!("load menus: {error}")))?;
            print_json(&availability_matrix(&catalog))
        }
    }
}

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn require_pool(pool: Option<DbPool>) -> io::Result<DbPool> {
    pool.ok_or_else(|| {
        invalid_input("database URL missing: set --database-url or FOODCART_DATABASE_URL".to_owned())
    })
}

fn geocoding_service(
    settings: &DispatchSettings,
    pool: Option<&DbPool>,
    metrics: Arc<dyn GeocodingMetrics>,
) -> io::Result<GeocodingService> {
    let cache: Arc<dyn GeocodeCache> = match pool {
        Some(pool) => Arc::new(DieselGeocodeCache::new(pool.clone())),
        None => Arc::new(InMemoryGeocodeCache::default()),
    };
    let provider: Arc<dyn GeocodingProvider> = match settings.geocoder_api_key() {
        Some(api_key) => {
            let endpoint = Url::parse(settings.geocoder_endpoint()).map_err(|error| {
                invalid_input(format!("FOODCART_GEOCODER_ENDPOINT: {error}"))
            })?;
            let geocoder = YandexGeocoder::new(endpoint, api_key, settings.geocoder_timeout())
                .map_err(|error| io::Error::other(format!("create geocoder client: {error}")))?;
            Arc::new(geocoder)
        }
        None => {
            warn!("geocoder API key missing; only cached coordinates will be used");
            Arc::new(DisabledGeocodingProvider)
        }
    };
    Ok(GeocodingService::new(cache, provider, metrics)
        .with_provider_timeout(settings.geocoder_timeout())
        .with_max_concurrency(settings.max_concurrent_geocodes()))
}

/// Geocoding metrics recorder plus whatever is needed to report it.
///
/// With the `metrics` feature the counters live in a Prometheus registry that
/// is written to stderr in text exposition format when the command finishes.
/// Without it every outcome is logged as it happens.
struct MetricsHandle {
    recorder: Arc<dyn GeocodingMetrics>,
    #[cfg(feature = "metrics")]
    registry: prometheus::Registry,
}

impl MetricsHandle {
    #[cfg(feature = "metrics")]
    fn new() -> io::Result<Self> {
        use foodcart_backend::outbound::metrics::PrometheusGeocodingMetrics;

        let registry = prometheus::Registry::new();
        let recorder = PrometheusGeocodingMetrics::new(&registry)
            .map_err(|error| io::Error::other(format!("register metrics: {error}")))?;
        Ok(Self {
            recorder: Arc::new(recorder),
            registry,
        })
    }

    #[cfg(not(feature = "metrics"))]
    #[expect(
        clippy::unnecessary_wraps,
        reason = "matches the metrics-enabled signature"
    )]
    fn new() -> io::Result<Self> {
        use foodcart_backend::outbound::tracing_metrics::TracingGeocodingMetrics;

        Ok(Self {
            recorder: Arc::new(TracingGeocodingMetrics),
        })
    }

    fn recorder(&self) -> Arc<dyn GeocodingMetrics> {
        Arc::clone(&self.recorder)
    }

    #[cfg(feature = "metrics")]
    fn report(&self) {
        match render_metrics(&self.registry) {
            Ok(rendered) => eprint!("{rendered}"),
            Err(error) => warn!(error = %error, "metrics export failed"),
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn report(&self) {}
}

#[cfg(feature = "metrics")]
fn render_metrics(registry: &prometheus::Registry) -> io::Result<String> {
    prometheus::TextEncoder::new()
        .encode_to_string(&registry.gather())
        .map_err(|error| io::Error::other(format!("encode metrics: {error}")))
}

fn outcome_json(address: &str, outcome: &GeocodeOutcome) -> serde_json::Value {
    let (source, failure) = match outcome {
        GeocodeOutcome::Cached(_) => ("cache", None),
        GeocodeOutcome::Fetched(_) => ("provider", None),
        GeocodeOutcome::Degraded { failure, .. } => ("degraded", Some(failure.to_string())),
    };
    json!({
        "address": address,
        "source": source,
        "coordinates": outcome.coordinates(),
        "failure": failure,
    })
}

fn print_json(value: &impl serde::Serialize) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| io::Error::other(format!("render JSON: {error}")))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use clap::Parser;
    use foodcart_backend::domain::ports::GeocodeFailureKind;
    use foodcart_backend::domain::{CoverageRule, Coordinates, GeocodeFailure, GeocodeOutcome};
    use rstest::rstest;

    use super::{CliArgs, Command, MetricsHandle, outcome_json, parse_rule, require_pool};

    #[rstest]
    fn parses_geocode_subcommand_with_global_flags() {
        let args = CliArgs::try_parse_from([
            "dispatch-board",
            "geocode",
            "Red Square 1",
            "--coverage-rule",
            "exact",
        ])
        .expect("arguments should parse");

        assert_eq!(args.coverage_rule, Some(CoverageRule::ExactMatch));
        assert!(matches!(args.command, Command::Geocode { ref address } if address == "Red Square 1"));
    }

    #[rstest]
    fn rejects_unknown_rules() {
        let error = parse_rule("superset").expect_err("unknown rule");
        assert!(error.contains("superset"));
    }

    #[rstest]
    fn board_requires_a_database() {
        let error = require_pool(None).expect_err("missing pool");
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn degraded_outcomes_render_failure_and_fallback() {
        let outcome = GeocodeOutcome::Degraded {
            fallback: None,
            failure: GeocodeFailure::new(GeocodeFailureKind::NoCandidates, "zero results"),
        };
        let value = outcome_json("Nowhere", &outcome);

        assert_eq!(value["source"], "degraded");
        assert!(value["coordinates"].is_null());
        assert_eq!(value["failure"], "no_candidates: zero results");
    }

    #[rstest]
    fn cached_outcomes_render_coordinates() {
        let point = Coordinates::new(55.75, 37.61).expect("valid coordinates");
        let value = outcome_json("Arbat 1", &GeocodeOutcome::Cached(point));

        assert_eq!(value["source"], "cache");
        assert!(value["failure"].is_null());
        assert!(value["coordinates"].is_object());
    }

    #[tokio::test]
    async fn metrics_handle_accepts_recorded_outcomes() {
        let handle = MetricsHandle::new().expect("metrics handle");
        let recorder = handle.recorder();

        recorder.record_cache_hit().await.expect("record hit");
        recorder
            .record_failure(GeocodeFailureKind::NoCandidates)
            .await
            .expect("record failure");
        handle.report();
    }

    #[cfg(feature = "metrics")]
    #[tokio::test]
    async fn recorded_outcomes_appear_in_exported_metrics() {
        let handle = MetricsHandle::new().expect("metrics handle");
        let recorder = handle.recorder();
        recorder.record_cache_hit().await.expect("record hit");
        recorder.record_cache_hit().await.expect("record hit");
        recorder
            .record_failure(GeocodeFailureKind::ProviderUnavailable)
            .await
            .expect("record failure");

        let rendered = super::render_metrics(&handle.registry).expect("render metrics");

        assert!(
            rendered.contains(r#"geocoding_lookups_total{outcome="cache_hit"} 2"#),
            "unexpected export: {rendered}"
        );
        assert!(
            rendered.contains(r#"geocoding_lookups_total{outcome="provider_unavailable"} 1"#),
            "unexpected export: {rendered}"
        );
    }
}
