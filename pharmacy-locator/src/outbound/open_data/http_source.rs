//! Reqwest-backed open-data pharmacy listing adapter.
//!
//! This adapter owns transport details only: query construction, timeout and
//! HTTP error mapping, and XML decoding into detail records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::xml::parse_detail_page;
use crate::domain::ports::{
    DetailSourceError, PharmacyDetailRecord, PharmacyDetailRequest, PharmacyDetailSource,
};
use crate::outbound::http_support::{describe_status, describe_transport};

/// National medical centre pharmacy listing endpoint.
pub const DEFAULT_DETAIL_ENDPOINT: &str =
    "https://apis.data.go.kr/B552657/ErmctInsttInfoInqireService/getParmacyListInfoInqire";

const QUERY_TYPE: &str = "1";
const ORDER_BY_NAME: &str = "NAME";

/// Detail source issuing one GET per lookup.
pub struct OpenDataPharmacySource {
    client: Client,
    endpoint: Url,
    service_key: Zeroizing<String>,
}

impl OpenDataPharmacySource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// `service_key` is sent exactly as issued by the data portal, which hands
    /// out keys already percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            service_key: Zeroizing::new(service_key.into()),
        })
    }
}

#[async_trait]
impl PharmacyDetailSource for OpenDataPharmacySource {
    async fn fetch_details(
        &self,
        request: &PharmacyDetailRequest,
    ) -> Result<Vec<PharmacyDetailRecord>, DetailSourceError> {
        let url = build_listing_url(&self.endpoint, &self.service_key, request)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/xml")
            .send()
            .await
            .map_err(|error| DetailSourceError::request_failed(describe_transport(&error)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| DetailSourceError::request_failed(describe_transport(&error)))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_detail_page(body.as_ref())?.into_records()
    }
}

/// Non-2xx listing responses carry no usable page.
fn map_status_error(status: StatusCode, body: &[u8]) -> DetailSourceError {
    DetailSourceError::decoding(describe_status(status, body))
}

fn build_listing_url(
    endpoint: &Url,
    service_key: &str,
    request: &PharmacyDetailRequest,
) -> Result<Url, DetailSourceError> {
    if endpoint.cannot_be_a_base() {
        return Err(DetailSourceError::invalid_url(format!(
            "endpoint {endpoint} cannot carry query parameters"
        )));
    }
    if request.name.trim().is_empty() {
        return Err(DetailSourceError::invalid_url("pharmacy name is blank"));
    }

    let query = format!(
        "serviceKey={service_key}&Q0={province}&Q1={district}&QT={QUERY_TYPE}\
         &QN={name}&ORD={ORDER_BY_NAME}&pageNo={page}&numOfRows={rows}",
        province = urlencoding::encode(&request.region.province),
        district = urlencoding::encode(&request.region.district),
        name = urlencoding::encode(&request.name),
        page = request.page.max(1),
        rows = request.rows.max(1),
    );
    let mut url = endpoint.clone();
    url.set_query(Some(&query));
    Ok(url)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network listing helpers.

    use super::*;
    use crate::domain::RegionKey;
    use rstest::rstest;

    fn request(name: &str) -> PharmacyDetailRequest {
        PharmacyDetailRequest::first_page(RegionKey::new("서울특별시", "강남구"), name, 10)
    }

    #[test]
    fn encodes_region_and_name() {
        let endpoint = Url::parse(DEFAULT_DETAIL_ENDPOINT).expect("endpoint parses");
        let url = build_listing_url(&endpoint, "abc%2Bdef%3D%3D", &request("온누리 약국"))
            .expect("url should build");

        assert_eq!(
            url.query(),
            Some(
                "serviceKey=abc%2Bdef%3D%3D\
                 &Q0=%EC%84%9C%EC%9A%B8%ED%8A%B9%EB%B3%84%EC%8B%9C\
                 &Q1=%EA%B0%95%EB%82%A8%EA%B5%AC&QT=1\
                 &QN=%EC%98%A8%EB%88%84%EB%A6%AC%20%EC%95%BD%EA%B5%AD\
                 &ORD=NAME&pageNo=1&numOfRows=10"
            )
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        let endpoint = Url::parse(DEFAULT_DETAIL_ENDPOINT).expect("endpoint parses");
        let error = build_listing_url(&endpoint, "key", &request("  ")).expect_err("must fail");
        assert!(matches!(error, DetailSourceError::InvalidUrl { .. }));
    }

    #[rstest]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, b"Unauthorized".as_slice())]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, b"".as_slice())]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE, b"<OpenAPI_ServiceResponse/>".as_slice())]
    fn status_errors_map_to_decoding(#[case] status: StatusCode, #[case] body: &[u8]) {
        let error = map_status_error(status, body);
        assert!(matches!(error, DetailSourceError::Decoding { .. }));
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }
}
