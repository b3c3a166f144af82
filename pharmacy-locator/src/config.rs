//! Provider endpoints, credentials, and pipeline tuning loaded via OrthoConfig.
//!
//! Tuning values carry OrthoConfig defaults and endpoints fall back through
//! their accessors, so a bare environment still yields a usable
//! configuration apart from the API keys.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DiscoveryConfig;
use crate::outbound::kakao::{
    DEFAULT_CATEGORY_CODE, DEFAULT_GEOCODE_ENDPOINT, DEFAULT_NEARBY_ENDPOINT,
};
use crate::outbound::open_data::DEFAULT_DETAIL_ENDPOINT;

/// Configuration for the discovery pipeline and its providers.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PHARMACY_LOCATOR")]
pub struct LocatorSettings {
    /// Kakao category search endpoint.
    pub nearby_endpoint: Option<String>,
    /// Kakao REST API key, shared by search and geocoding.
    pub nearby_api_key: Option<String>,
    /// Category group searched around the camera.
    pub nearby_category_code: Option<String>,
    /// Search radius in metres.
    #[ortho_config(default = 1000)]
    pub search_radius_meters: u32,
    /// Open-data pharmacy listing endpoint.
    pub detail_endpoint: Option<String>,
    /// Data portal service key, as issued.
    pub detail_service_key: Option<String>,
    /// Page size for detail lookups.
    #[ortho_config(default = 10)]
    pub detail_rows: u32,
    /// Kakao coordinate-to-address endpoint.
    pub geocode_endpoint: Option<String>,
    /// Camera quiet period before a search fires.
    #[ortho_config(default = 800)]
    pub debounce_millis: u64,
    /// Per-request HTTP timeout.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
    /// Interval between open-status refreshes.
    #[ortho_config(default = 60)]
    pub status_refresh_secs: u64,
}

impl LocatorSettings {
    /// Return the search endpoint, falling back to Kakao's.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured value is not a URL.
    pub fn nearby_endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(
            self.nearby_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_NEARBY_ENDPOINT),
        )
    }

    /// Return the detail endpoint, falling back to the data portal's.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured value is not a URL.
    pub fn detail_endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(
            self.detail_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_DETAIL_ENDPOINT),
        )
    }

    /// Return the geocoding endpoint, falling back to Kakao's.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured value is not a URL.
    pub fn geocode_endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(
            self.geocode_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_GEOCODE_ENDPOINT),
        )
    }

    /// Return the category group code, falling back to pharmacies.
    pub fn nearby_category_code(&self) -> &str {
        self.nearby_category_code
            .as_deref()
            .unwrap_or(DEFAULT_CATEGORY_CODE)
    }

    /// Return the HTTP timeout applied to every provider request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build controller tuning from the configured values.
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            search_radius_meters: self.search_radius_meters,
            debounce_window: Duration::from_millis(self.debounce_millis),
            status_refresh_interval: Duration::from_secs(self.status_refresh_secs),
            detail_rows: self.detail_rows,
        }
    }
}

impl fmt::Debug for LocatorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redacted(key: Option<&String>) -> Option<&'static str> {
            key.map(|_| "<redacted>")
        }

        f.debug_struct("LocatorSettings")
            .field("nearby_endpoint", &self.nearby_endpoint)
            .field("nearby_api_key", &redacted(self.nearby_api_key.as_ref()))
            .field("nearby_category_code", &self.nearby_category_code)
            .field("search_radius_meters", &self.search_radius_meters)
            .field("detail_endpoint", &self.detail_endpoint)
            .field(
                "detail_service_key",
                &redacted(self.detail_service_key.as_ref()),
            )
            .field("detail_rows", &self.detail_rows)
            .field("geocode_endpoint", &self.geocode_endpoint)
            .field("debounce_millis", &self.debounce_millis)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("status_refresh_secs", &self.status_refresh_secs)
            .finish()
    }
}
