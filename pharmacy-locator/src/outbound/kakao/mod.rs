//! Kakao Local API adapters.
//!
//! Both endpoints authenticate with a `KakaoAK` REST key header and take
//! coordinates as `x` (longitude) and `y` (latitude).

mod dto;
mod geocoder;
mod nearby_source;

pub use geocoder::{DEFAULT_GEOCODE_ENDPOINT, KakaoReverseGeocoder};
pub use nearby_source::{
    DEFAULT_CATEGORY_CODE, DEFAULT_NEARBY_ENDPOINT, KakaoNearbySource, MAX_RADIUS_METERS,
};

fn authorization(api_key: &str) -> String {
    format!("KakaoAK {api_key}")
}
