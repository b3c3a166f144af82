//! Driven port resolving a coordinate to its province and district.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Coordinate, RegionKey};

define_port_error! {
    /// Errors surfaced while reverse geocoding.
    pub enum GeocodeError {
        /// The geocoding service could not be reached.
        RequestFailed { message: String } =>
            "reverse geocoding request failed: {message}",
        /// No placemark was found, or it did not contain a usable region.
        GeocodeFailed { message: String } =>
            "reverse geocoding yielded no region: {message}",
    }
}

/// Port for coordinate-to-region lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve the `(province, district)` pair containing `coordinate`.
    ///
    /// The province is returned as the geocoder reports it; callers normalise
    /// it before querying the open-data provider.
    async fn resolve_region(&self, coordinate: Coordinate) -> Result<RegionKey, GeocodeError>;
}

/// Fixture geocoder that never resolves a region.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureReverseGeocoder;

#[async_trait]
impl ReverseGeocoder for FixtureReverseGeocoder {
    async fn resolve_region(&self, coordinate: Coordinate) -> Result<RegionKey, GeocodeError> {
        Err(GeocodeError::geocode_failed(format!(
            "fixture geocoder has no placemark for ({}, {})",
            coordinate.latitude, coordinate.longitude
        )))
    }
}
