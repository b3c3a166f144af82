//! Pharmacy records shown on the map.
//!
//! A pharmacy has no stable server identifier. Identity is the
//! `(name, address)` pair, so two distinct pharmacies that share both strings
//! are indistinguishable.

use chrono::NaiveDateTime;

use super::operating_hours::OperatingHours;
use super::region::RegionKey;

/// WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate from latitude and longitude.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Identity of a pharmacy: its name and lot-number address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PharmacyKey {
    /// Pharmacy name.
    pub name: String,
    /// Lot-number address.
    pub address: String,
}

/// One pharmacy and its enrichment state.
#[derive(Debug, Clone, PartialEq)]
pub struct Pharmacy {
    /// Display name.
    pub name: String,
    /// Lot-number address, e.g. `서울 강남구 역삼동 736-1`.
    pub address: String,
    /// Road-name address.
    pub road_address: String,
    /// Contact phone number.
    pub phone: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Up to two leading address tokens: province then district.
    pub city: Vec<String>,
    /// Weekly hours; empty until enrichment succeeds.
    pub operating_hours: OperatingHours,
    /// Open at the last evaluation instant. Never true while hours are empty.
    pub is_open: bool,
}

impl Pharmacy {
    /// Create a summary record with no hours.
    ///
    /// # Examples
    /// ```
    /// use pharmacy_locator::domain::Pharmacy;
    ///
    /// let pharmacy = Pharmacy::new("온누리약국", "서울 강남구 역삼동 736-1", 37.5, 127.03);
    /// assert_eq!(pharmacy.city, vec!["서울".to_owned(), "강남구".to_owned()]);
    /// assert!(!pharmacy.is_open);
    /// ```
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let address = address.into();
        Self {
            name: name.into(),
            city: city_from_address(&address),
            address,
            road_address: String::new(),
            phone: String::new(),
            latitude,
            longitude,
            operating_hours: OperatingHours::new(),
            is_open: false,
        }
    }

    /// Attach a road-name address.
    #[must_use]
    pub fn with_road_address(mut self, road_address: impl Into<String>) -> Self {
        self.road_address = road_address.into();
        self
    }

    /// Attach a phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Identity key for deduplication and enrichment claims.
    pub fn key(&self) -> PharmacyKey {
        PharmacyKey {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }

    /// Whether `other` has the same `(name, address)` identity.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.name == other.name && self.address == other.address
    }

    /// Map position.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Region derived from the address, when it has at least two tokens.
    pub fn address_region(&self) -> Option<RegionKey> {
        RegionKey::from_parts(&self.city)
    }

    /// Replace the weekly hours and re-evaluate the open flag at `now`.
    pub fn apply_hours(&mut self, hours: OperatingHours, now: NaiveDateTime) {
        self.operating_hours = hours;
        self.refresh_open_status(now);
    }

    /// Re-evaluate the open flag at `now`; returns whether it changed.
    pub fn refresh_open_status(&mut self, now: NaiveDateTime) -> bool {
        let is_open = self.operating_hours.is_open_at(now);
        let changed = is_open != self.is_open;
        self.is_open = is_open;
        changed
    }
}

fn city_from_address(address: &str) -> Vec<String> {
    address
        .split_whitespace()
        .take(2)
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    //! Pharmacy identity and address-derived region behaviour.

    use super::*;
    use chrono::{NaiveDate, Weekday};
    use rstest::rstest;

    use crate::domain::operating_hours::{Boundary, DaySlot};

    #[rstest]
    #[case::full("서울 강남구 역삼동 736-1", &["서울", "강남구"])]
    #[case::single("세종", &["세종"])]
    #[case::blank("   ", &[])]
    fn derives_city_tokens(#[case] address: &str, #[case] expected: &[&str]) {
        let pharmacy = Pharmacy::new("약국", address, 0.0, 0.0);
        assert_eq!(pharmacy.city, expected);
    }

    #[test]
    fn address_region_requires_two_tokens() {
        let short = Pharmacy::new("약국", "세종", 0.0, 0.0);
        assert!(short.address_region().is_none());

        let full = Pharmacy::new("약국", "부산 해운대구 우동", 0.0, 0.0);
        assert_eq!(
            full.address_region(),
            Some(RegionKey::new("부산", "해운대구"))
        );
    }

    #[test]
    fn identity_ignores_phone_and_coordinates() {
        let a = Pharmacy::new("온누리약국", "서울 중구 명동", 37.5, 126.9).with_phone("02-1");
        let b = Pharmacy::new("온누리약국", "서울 중구 명동", 37.6, 127.0).with_phone("02-2");
        let c = Pharmacy::new("온누리약국", "서울 중구 을지로", 37.5, 126.9);
        assert!(a.same_identity(&b));
        assert_eq!(a.key(), b.key());
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn applying_hours_recomputes_open_flag() {
        // 2026-10-19 is a Monday.
        let noon = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|day| day.and_hms_opt(12, 0, 0))
            .expect("valid timestamp");
        let mut hours = OperatingHours::new();
        hours.set(DaySlot::Weekday(Weekday::Mon), Boundary::Start, "0900");
        hours.set(DaySlot::Weekday(Weekday::Mon), Boundary::End, "1800");

        let mut pharmacy = Pharmacy::new("약국", "서울 중구 명동", 0.0, 0.0);
        pharmacy.apply_hours(hours, noon);
        assert!(pharmacy.is_open);

        pharmacy.apply_hours(OperatingHours::new(), noon);
        assert!(!pharmacy.is_open);
    }
}
