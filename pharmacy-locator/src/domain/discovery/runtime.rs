//! Port bundle and tuning knobs for the discovery controller.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::debounce::DEFAULT_QUIESCENCE_WINDOW;
use crate::domain::enrichment::DEFAULT_DETAIL_ROWS;
use crate::domain::ports::{
    DEFAULT_SEARCH_RADIUS_METERS, NearbyPharmacySource, PharmacyDetailSource, ReverseGeocoder,
};

/// Port bundle required by the discovery controller.
pub struct DiscoveryPorts {
    /// Radius search adapter.
    pub nearby_source: Arc<dyn NearbyPharmacySource>,
    /// Open-data hours adapter.
    pub detail_source: Arc<dyn PharmacyDetailSource>,
    /// Coordinate-to-region adapter.
    pub geocoder: Arc<dyn ReverseGeocoder>,
}

impl DiscoveryPorts {
    /// Build a strongly-typed port bundle.
    pub fn new(
        nearby_source: Arc<dyn NearbyPharmacySource>,
        detail_source: Arc<dyn PharmacyDetailSource>,
        geocoder: Arc<dyn ReverseGeocoder>,
    ) -> Self {
        Self {
            nearby_source,
            detail_source,
            geocoder,
        }
    }
}

/// Discovery controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Radius sent with every nearby query.
    pub search_radius_meters: u32,
    /// Camera quiet period before a nearby query fires.
    pub debounce_window: Duration,
    /// How often open flags are re-evaluated against the clock.
    pub status_refresh_interval: Duration,
    /// Page size for open-data lookups.
    pub detail_rows: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            debounce_window: DEFAULT_QUIESCENCE_WINDOW,
            status_refresh_interval: Duration::from_secs(60),
            detail_rows: DEFAULT_DETAIL_ROWS,
        }
    }
}
