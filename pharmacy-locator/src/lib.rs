//! Nearby pharmacy discovery library.
//!
//! The domain owns the pharmacy collection, debounce scheduling, opening-hours
//! evaluation, and the discovery controller. Outbound adapters implement the
//! domain ports against the map search, open-data, and geocoding providers.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
