//! Outbound adapters implementing domain ports for external providers.
//!
//! - **kakao**: map category search and coordinate-to-address lookups
//! - **open_data**: the national medical centre pharmacy listing (XML)
//!
//! Adapters are thin translators between wire formats and domain types. They
//! contain no pipeline logic.

mod http_support;
pub mod kakao;
pub mod open_data;
