//! Dispatcher configuration loaded via OrthoConfig.
//!
//! Values come from `FOODCART_*` environment variables and configuration
//! files. Every field is optional; accessors apply defaults.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    CoverageRule, CoverageRuleParseError, DEFAULT_MAX_CONCURRENCY, DEFAULT_PROVIDER_TIMEOUT,
};
use crate::outbound::yandex::DEFAULT_YANDEX_ENDPOINT;

/// Configuration values for the dispatcher board.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOODCART")]
pub struct DispatchSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Yandex geocoder API key. Geocoding is disabled when absent.
    pub geocoder_api_key: Option<String>,
    /// Geocoder endpoint override.
    pub geocoder_endpoint: Option<String>,
    /// Provider call timeout in milliseconds.
    pub geocoder_timeout_ms: Option<u64>,
    /// Upper bound on concurrent provider calls during batch resolution.
    pub max_concurrent_geocodes: Option<usize>,
    /// Menu coverage rule name: `subset` or `exact`.
    pub coverage_rule: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl DispatchSettings {
    /// Database URL, if one is configured and not blank.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    /// Geocoder API key, if one is configured and not blank.
    pub fn geocoder_api_key(&self) -> Option<&str> {
        non_blank(self.geocoder_api_key.as_ref())
    }

    /// Geocoder endpoint, falling back to the public Yandex endpoint.
    pub fn geocoder_endpoint(&self) -> &str {
        non_blank(self.geocoder_endpoint.as_ref()).unwrap_or(DEFAULT_YANDEX_ENDPOINT)
    }

    /// Provider timeout; zero falls back to the default.
    pub fn geocoder_timeout(&self) -> Duration {
        self.geocoder_timeout_ms
            .filter(|millis| *millis > 0)
            .map_or(DEFAULT_PROVIDER_TIMEOUT, Duration::from_millis)
    }

    /// Concurrency bound; zero falls back to the default.
    pub fn max_concurrent_geocodes(&self) -> usize {
        self.max_concurrent_geocodes
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENCY)
    }

    /// Parsed coverage rule, defaulting to [`CoverageRule::Subset`].
    ///
    /// # Errors
    ///
    /// Returns an error when the configured name is not a known rule.
    pub fn coverage_rule(&self) -> Result<CoverageRule, CoverageRuleParseError> {
        non_blank(self.coverage_rule.as_ref()).map_or(Ok(CoverageRule::default()), str::parse)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for dispatcher configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 6] = [
        "FOODCART_DATABASE_URL",
        "FOODCART_GEOCODER_API_KEY",
        "FOODCART_GEOCODER_ENDPOINT",
        "FOODCART_GEOCODER_TIMEOUT_MS",
        "FOODCART_MAX_CONCURRENT_GEOCODES",
        "FOODCART_COVERAGE_RULE",
    ];

    fn empty() -> DispatchSettings {
        DispatchSettings {
            database_url: None,
            geocoder_api_key: None,
            geocoder_endpoint: None,
            geocoder_timeout_ms: None,
            max_concurrent_geocodes: None,
            coverage_rule: None,
        }
    }

    fn load_from_empty_args() -> DispatchSettings {
        DispatchSettings::load_from_iter([OsString::from("dispatch-board")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.geocoder_api_key(), None);
        assert_eq!(settings.geocoder_endpoint(), DEFAULT_YANDEX_ENDPOINT);
        assert_eq!(settings.geocoder_timeout(), DEFAULT_PROVIDER_TIMEOUT);
        assert_eq!(settings.max_concurrent_geocodes(), DEFAULT_MAX_CONCURRENCY);
        assert_eq!(settings.coverage_rule(), Ok(CoverageRule::Subset));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (KEYS[0], Some("postgres://localhost/foodcart".to_owned())),
            (KEYS[1], Some("secret".to_owned())),
            (KEYS[2], Some("http://127.0.0.1:9000/1.x".to_owned())),
            (KEYS[3], Some("250".to_owned())),
            (KEYS[4], Some("8".to_owned())),
            (KEYS[5], Some("exact".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Some("postgres://localhost/foodcart"));
        assert_eq!(settings.geocoder_api_key(), Some("secret"));
        assert_eq!(settings.geocoder_endpoint(), "http://127.0.0.1:9000/1.x");
        assert_eq!(settings.geocoder_timeout(), Duration::from_millis(250));
        assert_eq!(settings.max_concurrent_geocodes(), 8);
        assert_eq!(settings.coverage_rule(), Ok(CoverageRule::ExactMatch));
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(None, Some(0))]
    fn zero_limits_fall_back_to_defaults(
        #[case] timeout_ms: Option<u64>,
        #[case] concurrency: Option<usize>,
    ) {
        let settings = DispatchSettings {
            geocoder_timeout_ms: timeout_ms,
            max_concurrent_geocodes: concurrency,
            ..empty()
        };
        assert_eq!(settings.geocoder_timeout(), DEFAULT_PROVIDER_TIMEOUT);
        assert_eq!(settings.max_concurrent_geocodes(), DEFAULT_MAX_CONCURRENCY);
    }

    #[rstest]
    fn blank_secrets_count_as_missing() {
        let settings = DispatchSettings {
            database_url: Some("  ".to_owned()),
            geocoder_api_key: Some(String::new()),
            ..empty()
        };
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.geocoder_api_key(), None);
    }

    #[rstest]
    fn unknown_coverage_rules_are_reported() {
        let settings = DispatchSettings {
            coverage_rule: Some("superset".to_owned()),
            ..empty()
        };
        assert_eq!(
            settings.coverage_rule(),
            Err(CoverageRuleParseError("superset".to_owned()))
        );
    }
}
