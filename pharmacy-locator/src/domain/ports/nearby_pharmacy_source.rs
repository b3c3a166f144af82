//! Driven port for the radius-based nearby pharmacy search.
//!
//! The source returns summary records only: name, address, phone, and
//! position. Opening hours come from [`super::PharmacyDetailSource`].

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Coordinate, Pharmacy};

/// Search radius used when the caller does not pick one.
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 1_000;

/// Radius query around one map coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyPharmacyRequest {
    /// Centre latitude in degrees.
    pub latitude: f64,
    /// Centre longitude in degrees.
    pub longitude: f64,
    /// Search radius in metres.
    pub radius_meters: u32,
}

impl NearbyPharmacyRequest {
    /// Query around `centre` using [`DEFAULT_SEARCH_RADIUS_METERS`].
    pub fn around(centre: Coordinate) -> Self {
        Self {
            latitude: centre.latitude,
            longitude: centre.longitude,
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
        }
    }

    /// Override the search radius.
    #[must_use]
    pub fn with_radius(mut self, radius_meters: u32) -> Self {
        self.radius_meters = radius_meters;
        self
    }

    /// Query centre.
    pub fn centre(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

define_port_error! {
    /// Errors surfaced by the nearby search provider.
    pub enum NearbySourceError {
        /// The request URL could not be built from configuration and input.
        InvalidUrl { message: String } =>
            "nearby search request invalid: {message}",
        /// The provider could not be reached.
        RequestFailed { message: String } =>
            "nearby search request failed: {message}",
        /// The provider answered with a non-success status or an unexpected
        /// payload.
        Decoding { message: String } =>
            "nearby search response decode failed: {message}",
    }
}

/// Port for querying pharmacies around a coordinate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NearbyPharmacySource: Send + Sync {
    /// Fetch summary pharmacies around the request centre.
    ///
    /// An empty vector is a valid result.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use pharmacy_locator::domain::Coordinate;
    /// use pharmacy_locator::domain::ports::{
    ///     FixtureNearbyPharmacySource, NearbyPharmacyRequest, NearbyPharmacySource,
    /// };
    ///
    /// let source = FixtureNearbyPharmacySource;
    /// let request = NearbyPharmacyRequest::around(Coordinate::new(37.5665, 126.978));
    /// let pharmacies = source.fetch_nearby(&request).await?;
    /// assert!(pharmacies.is_empty());
    /// # Ok::<(), pharmacy_locator::domain::ports::NearbySourceError>(())
    /// ```
    async fn fetch_nearby(
        &self,
        request: &NearbyPharmacyRequest,
    ) -> Result<Vec<Pharmacy>, NearbySourceError>;
}

/// Fixture implementation returning no pharmacies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureNearbyPharmacySource;

#[async_trait]
impl NearbyPharmacySource for FixtureNearbyPharmacySource {
    async fn fetch_nearby(
        &self,
        _request: &NearbyPharmacyRequest,
    ) -> Result<Vec<Pharmacy>, NearbySourceError> {
        Ok(Vec::new())
    }
}
