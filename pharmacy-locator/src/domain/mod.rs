//! Domain types and services for nearby pharmacy discovery.
//!
//! Purpose: keep the pipeline's rules (identity, dedup-merge, enrichment
//! claims, opening-hours evaluation, debouncing) independent of the HTTP
//! providers, which live behind the traits in [`ports`].
//!
//! Public surface:
//! - Pharmacy / PharmacyKey / Coordinate: the shown records and their identity.
//! - PharmacyCollection: append-only list plus the loaded-keys set.
//! - OperatingHours / DailySchedule: weekly hours and open/closed evaluation.
//! - DebounceScheduler / LocationTracker: camera movement to fetch triggers.
//! - DetailEnricher: per-pharmacy hours lookup.
//! - DiscoveryController / DiscoveryHandle: the pipeline owner and its handle.

pub mod collection;
pub mod debounce;
pub mod discovery;
pub mod enrichment;
pub mod location;
pub mod operating_hours;
pub mod pharmacy;
pub mod ports;
pub mod region;

pub use self::collection::PharmacyCollection;
pub use self::debounce::{DEFAULT_QUIESCENCE_WINDOW, DebounceScheduler};
pub use self::discovery::{
    DiscoveryConfig, DiscoveryController, DiscoveryHandle, DiscoveryPorts, DiscoverySnapshot,
    DiscoveryStopped,
};
pub use self::enrichment::{DEFAULT_DETAIL_ROWS, DetailEnricher, EnrichmentError};
pub use self::location::LocationTracker;
pub use self::operating_hours::{
    Boundary, DailySchedule, DaySlot, NO_INFO, OperatingHours, format_hhmm, weekday_abbrev,
};
pub use self::pharmacy::{Coordinate, Pharmacy, PharmacyKey};
pub use self::region::{COUNTRY_ANCHOR, RegionKey, normalize_province, region_from_placemark};
