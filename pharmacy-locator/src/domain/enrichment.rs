//! Opening-hours enrichment for a single pharmacy.
//!
//! The enricher keys the lookup on the address region, queries the open-data
//! provider by name within that region, and returns the hours of the first
//! record. It never touches the shared collection; the discovery controller
//! merges the result back.

use std::sync::Arc;

use tracing::debug;

use super::pharmacy::Pharmacy;
use super::ports::{
    DetailSourceError, PharmacyDetailRequest, PharmacyDetailSource, ReverseGeocoder,
};
use super::{OperatingHours, RegionKey};

/// Page size requested from the open-data provider.
pub const DEFAULT_DETAIL_ROWS: u32 = 10;

/// Reasons an enrichment attempt produced no hours.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrichmentError {
    /// The address does not carry a province and district.
    #[error("no address region for {name}")]
    RegionUnavailable {
        /// Pharmacy name.
        name: String,
    },
    /// The open-data lookup failed.
    #[error(transparent)]
    Detail(#[from] DetailSourceError),
    /// The provider returned no record for the name.
    #[error("no open-data record matches {name}")]
    NoMatch {
        /// Pharmacy name.
        name: String,
    },
}

/// Looks up weekly hours for pharmacies.
pub struct DetailEnricher {
    detail_source: Arc<dyn PharmacyDetailSource>,
    geocoder: Arc<dyn ReverseGeocoder>,
    rows: u32,
}

impl DetailEnricher {
    /// Build an enricher over the given ports.
    pub fn new(
        detail_source: Arc<dyn PharmacyDetailSource>,
        geocoder: Arc<dyn ReverseGeocoder>,
    ) -> Self {
        Self {
            detail_source,
            geocoder,
            rows: DEFAULT_DETAIL_ROWS,
        }
    }

    /// Override the page size sent to the provider.
    #[must_use]
    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows.max(1);
        self
    }

    /// Resolve hours for `pharmacy`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentError`] when no region can be resolved, the
    /// provider call fails, or the provider has no matching record.
    pub async fn enrich(&self, pharmacy: &Pharmacy) -> Result<OperatingHours, EnrichmentError> {
        let region = self.resolve_region(pharmacy).await?;
        let request = PharmacyDetailRequest::first_page(
            region.normalized(),
            pharmacy.name.as_str(),
            self.rows,
        );
        let records = self.detail_source.fetch_details(&request).await?;
        debug!(
            name = %pharmacy.name,
            province = %request.region.province,
            district = %request.region.district,
            records = records.len(),
            "open-data lookup completed"
        );

        records
            .into_iter()
            .next()
            .map(|record| record.operating_hours)
            .ok_or_else(|| EnrichmentError::NoMatch {
                name: pharmacy.name.clone(),
            })
    }

    /// Region keyed on the address tokens.
    ///
    /// The coordinate is reverse geocoded before the lookup; the placemark
    /// only cross-checks the address and never replaces it.
    async fn resolve_region(&self, pharmacy: &Pharmacy) -> Result<RegionKey, EnrichmentError> {
        let region = pharmacy
            .address_region()
            .ok_or_else(|| EnrichmentError::RegionUnavailable {
                name: pharmacy.name.clone(),
            })?;

        match self.geocoder.resolve_region(pharmacy.coordinate()).await {
            Ok(placemark) if placemark.normalized() != region.normalized() => debug!(
                name = %pharmacy.name,
                address_district = %region.district,
                placemark_district = %placemark.district,
                "placemark disagrees with address; keeping address region"
            ),
            Ok(_) => {}
            Err(error) => debug!(
                name = %pharmacy.name,
                %error,
                "reverse geocoding failed; keeping address region"
            ),
        }
        Ok(region)
    }
}
