//! Domain ports for the discovery pipeline's external collaborators.
//!
//! Outbound adapters in `crate::outbound` implement these traits; the
//! discovery controller and detail enricher depend only on the traits.

mod macros;
mod nearby_pharmacy_source;
mod pharmacy_detail_source;
mod reverse_geocoder;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use nearby_pharmacy_source::MockNearbyPharmacySource;
pub use nearby_pharmacy_source::{
    DEFAULT_SEARCH_RADIUS_METERS, FixtureNearbyPharmacySource, NearbyPharmacyRequest,
    NearbyPharmacySource, NearbySourceError,
};
#[cfg(test)]
pub use pharmacy_detail_source::MockPharmacyDetailSource;
pub use pharmacy_detail_source::{
    DetailSourceError, FixturePharmacyDetailSource, PharmacyDetailRecord, PharmacyDetailRequest,
    PharmacyDetailSource,
};
#[cfg(test)]
pub use reverse_geocoder::MockReverseGeocoder;
pub use reverse_geocoder::{FixtureReverseGeocoder, GeocodeError, ReverseGeocoder};
