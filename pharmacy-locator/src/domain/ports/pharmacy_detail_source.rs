//! Driven port for the open-data pharmacy detail lookup.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{OperatingHours, RegionKey};

/// Lookup of one pharmacy by name inside a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PharmacyDetailRequest {
    /// Region with the province already in official form.
    pub region: RegionKey,
    /// Pharmacy name as shown on the map.
    pub name: String,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub rows: u32,
}

impl PharmacyDetailRequest {
    /// First page of `rows` results for `name` in `region`.
    pub fn first_page(region: RegionKey, name: impl Into<String>, rows: u32) -> Self {
        Self {
            region,
            name: name.into(),
            page: 1,
            rows,
        }
    }
}

/// One pharmacy record reported by the open-data provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PharmacyDetailRecord {
    /// Registered name (`dutyName`).
    pub name: String,
    /// Registered address (`dutyAddr`).
    pub address: String,
    /// Main phone number (`dutyTel1`).
    pub phone: String,
    /// Latitude (`wgs84Lat`); zero when unparsable.
    pub latitude: f64,
    /// Longitude (`wgs84Lon`); zero when unparsable.
    pub longitude: f64,
    /// Weekly and holiday hours (`dutyTime{1-8}{s,c}`).
    pub operating_hours: OperatingHours,
}

define_port_error! {
    /// Errors surfaced by the open-data provider.
    pub enum DetailSourceError {
        /// The request URL could not be built.
        InvalidUrl { message: String } =>
            "pharmacy detail request invalid: {message}",
        /// The provider could not be reached.
        RequestFailed { message: String } =>
            "pharmacy detail request failed: {message}",
        /// The provider answered with a non-success status or result code.
        Decoding { message: String } =>
            "pharmacy detail response rejected: {message}",
        /// The XML payload was malformed before any record completed.
        XmlParseFailed { message: String } =>
            "pharmacy detail XML parse failed: {message}",
    }
}

/// Port for looking up operating hours by pharmacy name and region.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PharmacyDetailSource: Send + Sync {
    /// Fetch the records matching `request`, in provider order.
    async fn fetch_details(
        &self,
        request: &PharmacyDetailRequest,
    ) -> Result<Vec<PharmacyDetailRecord>, DetailSourceError>;
}

/// Fixture implementation returning no records.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePharmacyDetailSource;

#[async_trait]
impl PharmacyDetailSource for FixturePharmacyDetailSource {
    async fn fetch_details(
        &self,
        _request: &PharmacyDetailRequest,
    ) -> Result<Vec<PharmacyDetailRecord>, DetailSourceError> {
        Ok(Vec::new())
    }
}
