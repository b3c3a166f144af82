//! Open-data pharmacy listing adapter.
//!
//! This module provides the HTTP implementation of the `PharmacyDetailSource`
//! port and the streaming XML decoder it relies on.

mod http_source;
mod xml;

pub use http_source::{DEFAULT_DETAIL_ENDPOINT, OpenDataPharmacySource};
