//! Reqwest-backed Yandex geocoder adapter.
//!
//! This adapter owns transport details only: query construction, timeout and
//! HTTP error mapping, and JSON decoding into geocode candidates. It makes a
//! single request per lookup and never retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use super::dto::GeocoderResponseDto;
use crate::domain::Address;
use crate::domain::ports::{GeocodeCandidate, GeocodingProvider, GeocodingProviderError};

/// Public Yandex geocoder HTTP endpoint.
pub const DEFAULT_YANDEX_ENDPOINT: &str = "https://geocode-maps.yandex.ru/1.x";
const PROVIDER_NAME: &str = "yandex";

/// Geocoding provider calling the Yandex HTTP geocoder.
pub struct YandexGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl YandexGeocoder {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl GeocodingProvider for YandexGeocoder {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn geocode(
        &self,
        address: &Address,
    ) -> Result<Vec<GeocodeCandidate>, GeocodingProviderError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("geocode", address.as_str()),
                ("format", "json"),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_candidates(body.as_ref())
    }
}

fn parse_candidates(body: &[u8]) -> Result<Vec<GeocodeCandidate>, GeocodingProviderError> {
    let decoded: GeocoderResponseDto = serde_json::from_slice(body).map_err(|error| {
        GeocodingProviderError::decode(format!("invalid geocoder JSON payload: {error}"))
    })?;
    decoded
        .into_candidates()
        .map_err(GeocodingProviderError::decode)
}

// Request URLs carry the API key, so they are stripped before formatting.
fn map_transport_error(error: reqwest::Error) -> GeocodingProviderError {
    let error = error.without_url();
    if error.is_timeout() {
        GeocodingProviderError::timeout(error.to_string())
    } else {
        GeocodingProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocodingProviderError {
    GeocodingProviderError::status(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
