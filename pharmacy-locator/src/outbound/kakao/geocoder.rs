//! Reqwest-backed Kakao coordinate-to-address adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::authorization;
use super::dto::CoordToAddressDto;
use crate::domain::ports::{GeocodeError, ReverseGeocoder};
use crate::domain::{COUNTRY_ANCHOR, Coordinate, RegionKey, region_from_placemark};
use crate::outbound::http_support::{describe_status, describe_transport};

/// Kakao Local coordinate-to-address endpoint.
pub const DEFAULT_GEOCODE_ENDPOINT: &str =
    "https://dapi.kakao.com/v2/local/geo/coord2address.json";

/// Reverse geocoder backed by Kakao `coord2address`.
///
/// Kakao only answers for domestic coordinates and omits the country from its
/// addresses, so the placemark description is anchored with the country name
/// before region extraction.
pub struct KakaoReverseGeocoder {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl KakaoReverseGeocoder {
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
            api_key: Zeroizing::new(api_key.into()),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for KakaoReverseGeocoder {
    async fn resolve_region(&self, coordinate: Coordinate) -> Result<RegionKey, GeocodeError> {
        let url = build_lookup_url(&self.endpoint, coordinate)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, authorization(&self.api_key))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| GeocodeError::request_failed(describe_transport(&error)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| GeocodeError::request_failed(describe_transport(&error)))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let description = parse_placemark(body.as_ref())?;
        debug!(%description, "resolved placemark");
        region_from_placemark(&description).ok_or_else(|| {
            GeocodeError::geocode_failed(format!("placemark {description:?} has no region"))
        })
    }
}

/// Non-2xx geocoding responses are request failures, not missing placemarks.
fn map_status_error(status: StatusCode, body: &[u8]) -> GeocodeError {
    GeocodeError::request_failed(describe_status(status, body))
}

fn build_lookup_url(endpoint: &Url, coordinate: Coordinate) -> Result<Url, GeocodeError> {
    if !coordinate.latitude.is_finite() || !coordinate.longitude.is_finite() {
        return Err(GeocodeError::geocode_failed(
            "coordinate must be finite to geocode",
        ));
    }
    if endpoint.cannot_be_a_base() {
        return Err(GeocodeError::request_failed(format!(
            "endpoint {endpoint} cannot carry query parameters"
        )));
    }
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("x", &coordinate.longitude.to_string())
        .append_pair("y", &coordinate.latitude.to_string());
    Ok(url)
}

/// Decode the response into a placemark description anchored by country.
fn parse_placemark(body: &[u8]) -> Result<String, GeocodeError> {
    let decoded: CoordToAddressDto = serde_json::from_slice(body).map_err(|error| {
        GeocodeError::geocode_failed(format!("invalid coord2address JSON: {error}"))
    })?;
    decoded
        .first_address()
        .map(|address| format!("{COUNTRY_ANCHOR} {address}"))
        .ok_or_else(|| GeocodeError::geocode_failed("no address for coordinate"))
}
