//! Reqwest-backed Kakao category search adapter.
//!
//! This adapter owns transport details only: query construction, timeout and
//! HTTP error mapping, and JSON decoding into summary pharmacies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::authorization;
use super::dto::CategorySearchDto;
use crate::domain::Pharmacy;
use crate::domain::ports::{NearbyPharmacyRequest, NearbyPharmacySource, NearbySourceError};
use crate::outbound::http_support::{describe_status, describe_transport};

/// Kakao Local category search endpoint.
pub const DEFAULT_NEARBY_ENDPOINT: &str = "https://dapi.kakao.com/v2/local/search/category.json";
/// Kakao category group code for pharmacies.
pub const DEFAULT_CATEGORY_CODE: &str = "PM9";
/// Largest radius Kakao accepts for category searches.
pub const MAX_RADIUS_METERS: u32 = 20_000;

/// Nearby search adapter issuing one GET per request.
pub struct KakaoNearbySource {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    category_code: String,
}

impl KakaoNearbySource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let endpoint = Url::parse(DEFAULT_NEARBY_ENDPOINT)?;
    /// let source = KakaoNearbySource::new(endpoint, "rest-api-key", Duration::from_secs(10))?;
    /// ```
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
            category_code: DEFAULT_CATEGORY_CODE.to_owned(),
        })
    }

    /// Search a different category group.
    #[must_use]
    pub fn with_category_code(mut self, category_code: impl Into<String>) -> Self {
        self.category_code = category_code.into();
        self
    }

    fn build_url(&self, request: &NearbyPharmacyRequest) -> Result<Url, NearbySourceError> {
        build_search_url(&self.endpoint, &self.category_code, request)
    }
}

#[async_trait]
impl NearbyPharmacySource for KakaoNearbySource {
    async fn fetch_nearby(
        &self,
        request: &NearbyPharmacyRequest,
    ) -> Result<Vec<Pharmacy>, NearbySourceError> {
        let url = self.build_url(request)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, authorization(&self.api_key))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| NearbySourceError::request_failed(describe_transport(&error)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| NearbySourceError::request_failed(describe_transport(&error)))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_pharmacies(body.as_ref())
    }
}

/// Non-2xx search responses carry no usable batch.
fn map_status_error(status: StatusCode, body: &[u8]) -> NearbySourceError {
    NearbySourceError::decoding(describe_status(status, body))
}

fn parse_pharmacies(body: &[u8]) -> Result<Vec<Pharmacy>, NearbySourceError> {
    let decoded: CategorySearchDto = serde_json::from_slice(body).map_err(|error| {
        NearbySourceError::decoding(format!("invalid category search JSON: {error}"))
    })?;
    Ok(decoded.into_domain_pharmacies())
}

fn build_search_url(
    endpoint: &Url,
    category_code: &str,
    request: &NearbyPharmacyRequest,
) -> Result<Url, NearbySourceError> {
    if !request.latitude.is_finite() || !request.longitude.is_finite() {
        return Err(NearbySourceError::invalid_url(
            "search centre must contain finite coordinates",
        ));
    }
    if request.radius_meters == 0 || request.radius_meters > MAX_RADIUS_METERS {
        return Err(NearbySourceError::invalid_url(format!(
            "radius must be within 1..={MAX_RADIUS_METERS} metres, got {}",
            request.radius_meters
        )));
    }
    if endpoint.cannot_be_a_base() {
        return Err(NearbySourceError::invalid_url(format!(
            "endpoint {endpoint} cannot carry query parameters"
        )));
    }

    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("category_group_code", category_code)
        .append_pair("x", &request.longitude.to_string())
        .append_pair("y", &request.latitude.to_string())
        .append_pair("radius", &request.radius_meters.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network category search helpers.

    use super::*;
    use crate::domain::Coordinate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn endpoint() -> Url {
        Url::parse(DEFAULT_NEARBY_ENDPOINT).expect("default endpoint parses")
    }

    #[rstest]
    fn builds_query_with_longitude_as_x(endpoint: Url) {
        let request = NearbyPharmacyRequest::around(Coordinate::new(37.5665, 126.978));
        let url = build_search_url(&endpoint, "PM9", &request).expect("url should build");

        assert_eq!(
            url.query(),
            Some("category_group_code=PM9&x=126.978&y=37.5665&radius=1000")
        );
    }

    #[rstest]
    #[case::nan_latitude(f64::NAN, 127.0, 1_000)]
    #[case::infinite_longitude(37.5, f64::INFINITY, 1_000)]
    #[case::zero_radius(37.5, 127.0, 0)]
    #[case::radius_too_large(37.5, 127.0, MAX_RADIUS_METERS + 1)]
    fn rejects_unusable_requests(
        endpoint: Url,
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] radius: u32,
    ) {
        let request =
            NearbyPharmacyRequest::around(Coordinate::new(latitude, longitude)).with_radius(radius);
        let error = build_search_url(&endpoint, "PM9", &request).expect_err("request must fail");
        assert!(
            matches!(error, NearbySourceError::InvalidUrl { .. }),
            "unusable requests should map to InvalidUrl",
        );
    }

    #[test]
    fn rejects_endpoints_without_a_base() {
        let endpoint = Url::parse("mailto:ops@example.invalid").expect("url parses");
        let request = NearbyPharmacyRequest::around(Coordinate::new(37.5, 127.0));
        let error = build_search_url(&endpoint, "PM9", &request).expect_err("must fail");
        assert!(matches!(error, NearbySourceError::InvalidUrl { .. }));
    }

    #[rstest]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, b"{\"message\":\"wrong appkey\"}".as_slice())]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, b"".as_slice())]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE, b"<html>maintenance</html>".as_slice())]
    fn status_errors_map_to_decoding(#[case] status: StatusCode, #[case] body: &[u8]) {
        let error = map_status_error(status, body);
        assert!(
            matches!(error, NearbySourceError::Decoding { .. }),
            "non-2xx search responses should map to Decoding",
        );
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }

    #[test]
    fn malformed_json_maps_to_decoding() {
        let error = parse_pharmacies(b"<html>gateway</html>").expect_err("decode should fail");
        assert!(
            matches!(error, NearbySourceError::Decoding { .. }),
            "non-JSON payloads should map to Decoding",
        );
    }

    #[test]
    fn missing_documents_is_an_empty_batch() {
        let pharmacies = parse_pharmacies(b"{\"meta\":{}}").expect("JSON should decode");
        assert!(pharmacies.is_empty());
    }
}
