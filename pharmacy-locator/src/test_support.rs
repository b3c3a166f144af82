//! Test utilities for the pharmacy-locator crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc, Weekday};
use mockable::Clock;

use crate::domain::ports::{
    DetailSourceError, GeocodeError, NearbyPharmacyRequest, NearbyPharmacySource,
    NearbySourceError, PharmacyDetailRecord, PharmacyDetailRequest, PharmacyDetailSource,
    ReverseGeocoder,
};
use crate::domain::{Boundary, Coordinate, DaySlot, OperatingHours, Pharmacy, RegionKey};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex poisoned"),
    }
}

/// Clock whose instant only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock fixed at a UTC instant.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock whose local wall-clock reading is `local`, whatever the host
    /// time zone.
    pub fn at_local(local: NaiveDateTime) -> Self {
        match Local.from_local_datetime(&local).earliest() {
            Some(instant) => Self::new(instant.with_timezone(&Utc)),
            None => panic!("local time {local} does not exist in the host time zone"),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        *lock(&self.0, "clock") += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

/// Hours that repeat `start`..`end` on every weekday.
pub fn every_day(start: &str, end: &str) -> OperatingHours {
    let mut hours = OperatingHours::new();
    for weekday in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ] {
        hours.set(DaySlot::Weekday(weekday), Boundary::Start, start);
        hours.set(DaySlot::Weekday(weekday), Boundary::End, end);
    }
    hours
}

/// Open-data record carrying `hours` for `name`.
pub fn detail_record(name: &str, hours: OperatingHours) -> PharmacyDetailRecord {
    PharmacyDetailRecord {
        name: name.to_owned(),
        operating_hours: hours,
        ..PharmacyDetailRecord::default()
    }
}

/// Summary pharmacy as the nearby source would return it.
pub fn summary(name: &str, address: &str) -> Pharmacy {
    Pharmacy::new(name, address, 37.5, 127.0)
}

/// Nearby source that replays scripted batches and records every request.
///
/// Once the script is exhausted it returns empty batches.
#[derive(Default)]
pub struct ScriptedNearbySource {
    scripted: Mutex<VecDeque<Result<Vec<Pharmacy>, NearbySourceError>>>,
    requests: Mutex<Vec<NearbyPharmacyRequest>>,
}

impl ScriptedNearbySource {
    /// Source replaying `scripted` in order.
    pub fn scripted(scripted: Vec<Result<Vec<Pharmacy>, NearbySourceError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<NearbyPharmacyRequest> {
        lock(&self.requests, "nearby requests").clone()
    }

    /// Number of fetches performed.
    pub fn call_count(&self) -> usize {
        lock(&self.requests, "nearby requests").len()
    }

    /// Centre of the most recent request.
    pub fn last_centre(&self) -> Option<Coordinate> {
        lock(&self.requests, "nearby requests")
            .last()
            .map(NearbyPharmacyRequest::centre)
    }
}

#[async_trait]
impl NearbyPharmacySource for ScriptedNearbySource {
    async fn fetch_nearby(
        &self,
        request: &NearbyPharmacyRequest,
    ) -> Result<Vec<Pharmacy>, NearbySourceError> {
        lock(&self.requests, "nearby requests").push(*request);
        lock(&self.scripted, "nearby script")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Detail source answering per pharmacy name and counting lookups.
#[derive(Default)]
pub struct ScriptedDetailSource {
    responses: HashMap<String, Result<Vec<PharmacyDetailRecord>, DetailSourceError>>,
    requests: Mutex<Vec<PharmacyDetailRequest>>,
    calls: AtomicUsize,
}

impl ScriptedDetailSource {
    /// Answer lookups for `name` with `response`.
    #[must_use]
    pub fn with_response(
        mut self,
        name: &str,
        response: Result<Vec<PharmacyDetailRecord>, DetailSourceError>,
    ) -> Self {
        self.responses.insert(name.to_owned(), response);
        self
    }

    /// Answer lookups for `name` with a single record carrying `hours`.
    #[must_use]
    pub fn with_hours(self, name: &str, hours: OperatingHours) -> Self {
        let record = detail_record(name, hours);
        self.with_response(name, Ok(vec![record]))
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<PharmacyDetailRequest> {
        lock(&self.requests, "detail requests").clone()
    }

    /// Number of lookups performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of lookups performed for `name`.
    pub fn calls_for(&self, name: &str) -> usize {
        lock(&self.requests, "detail requests")
            .iter()
            .filter(|request| request.name == name)
            .count()
    }
}

#[async_trait]
impl PharmacyDetailSource for ScriptedDetailSource {
    async fn fetch_details(
        &self,
        request: &PharmacyDetailRequest,
    ) -> Result<Vec<PharmacyDetailRecord>, DetailSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests, "detail requests").push(request.clone());
        self.responses
            .get(&request.name)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Geocoder that returns the same answer for every coordinate.
pub struct StaticGeocoder(Result<RegionKey, GeocodeError>);

impl StaticGeocoder {
    /// Always resolve to `region`.
    pub fn resolving(region: RegionKey) -> Self {
        Self(Ok(region))
    }

    /// Always fail, forcing the address fallback.
    pub fn failing() -> Self {
        Self(Err(GeocodeError::geocode_failed("static geocoder has no placemark")))
    }
}

#[async_trait]
impl ReverseGeocoder for StaticGeocoder {
    async fn resolve_region(&self, _coordinate: Coordinate) -> Result<RegionKey, GeocodeError> {
        self.0.clone()
    }
}
