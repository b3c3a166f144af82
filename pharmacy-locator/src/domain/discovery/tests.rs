//! Unit tests for discovery controller orchestration.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Weekday};
use rstest::{fixture, rstest};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use super::*;
use crate::domain::ports::{DetailSourceError, MockNearbyPharmacySource, PharmacyDetailSource};
use crate::domain::{Boundary, DaySlot, RegionKey};
use crate::test_support::{
    MutableClock, ScriptedDetailSource, ScriptedNearbySource, StaticGeocoder, every_day, summary,
};

const WAIT_LIMIT: Duration = Duration::from_secs(30);

// 2026-10-19 is a Monday.
fn monday_noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|day| day.and_hms_opt(12, 0, 0))
        .expect("valid timestamp")
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::at_local(monday_noon()))
}

struct Harness {
    handle: DiscoveryHandle,
    task: JoinHandle<()>,
}

impl Harness {
    fn start(
        nearby: Arc<dyn NearbyPharmacySource>,
        detail: Arc<dyn PharmacyDetailSource>,
        clock: Arc<MutableClock>,
        config: DiscoveryConfig,
    ) -> Self {
        let ports = DiscoveryPorts::new(
            nearby,
            detail,
            Arc::new(StaticGeocoder::resolving(RegionKey::new("서울", "강남구"))),
        );
        let (controller, handle) = DiscoveryController::new(ports, clock, config);
        let task = tokio::spawn(controller.run());
        Self { handle, task }
    }

    async fn settle_after(&self, fetches: u64) -> DiscoverySnapshot {
        timeout(
            WAIT_LIMIT,
            self.handle
                .wait_for(|snapshot| snapshot.completed_fetches >= fetches && snapshot.is_settled()),
        )
        .await
        .expect("controller should settle in time")
        .expect("controller should still be running")
    }

    async fn stop(self) {
        self.handle.shutdown().expect("controller running");
        self.task.await.expect("controller task joins");
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn camera_moves_are_debounced_into_one_fetch(clock: Arc<MutableClock>) {
    let nearby = Arc::new(ScriptedNearbySource::default());
    let harness = Harness::start(
        nearby.clone(),
        Arc::new(ScriptedDetailSource::default()),
        clock,
        DiscoveryConfig::default(),
    );

    let last = Coordinate::new(37.5, 127.05);
    let intermediate = [127.0, 127.001, 127.002, 127.003, 127.004];
    for longitude in intermediate {
        harness
            .handle
            .camera_moved(Coordinate::new(37.5, longitude))
            .expect("controller running");
        sleep(Duration::from_millis(50)).await;
    }
    harness.handle.camera_moved(last).expect("controller running");

    harness.settle_after(1).await;
    sleep(Duration::from_secs(3)).await;

    assert_eq!(nearby.call_count(), 1);
    assert_eq!(nearby.last_centre(), Some(last));
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn new_pharmacies_are_merged_then_enriched(clock: Arc<MutableClock>) {
    let nearby = Arc::new(ScriptedNearbySource::scripted(vec![Ok(vec![
        summary("A약국", "서울 강남구 역삼동 1"),
        summary("B약국", "서울 강남구 역삼동 2"),
    ])]));
    let detail =
        Arc::new(ScriptedDetailSource::default().with_hours("A약국", every_day("0000", "2400")));
    let harness = Harness::start(nearby, detail.clone(), clock, DiscoveryConfig::default());

    harness
        .handle
        .fetch_now(Coordinate::new(37.5, 127.0))
        .expect("controller running");
    let snapshot = harness.settle_after(1).await;

    let names: Vec<_> = snapshot.pharmacies.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["A약국", "B약국"]);

    let enriched = snapshot.find("A약국").expect("A listed");
    assert!(enriched.is_open);
    assert_eq!(enriched.operating_hours.get("mon_s"), Some("0000"));

    let unmatched = snapshot.find("B약국").expect("B listed");
    assert!(unmatched.operating_hours.is_empty());
    assert!(!unmatched.is_open);

    assert_eq!(detail.call_count(), 2);
    assert!(
        detail
            .requests()
            .iter()
            .all(|request| request.region == RegionKey::new("서울특별시", "강남구"))
    );
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn revisited_pharmacies_are_enriched_once(clock: Arc<MutableClock>) {
    let first = vec![
        summary("A약국", "서울 강남구 역삼동 1"),
        summary("B약국", "서울 강남구 역삼동 2"),
    ];
    let second = vec![
        summary("B약국", "서울 강남구 역삼동 2"),
        summary("C약국", "서울 강남구 역삼동 3"),
        summary("A약국", "서울 강남구 역삼동 1"),
    ];
    let nearby = Arc::new(ScriptedNearbySource::scripted(vec![Ok(first), Ok(second)]));
    let detail = Arc::new(ScriptedDetailSource::default().with_response(
        "A약국",
        Err(DetailSourceError::request_failed("connection reset")),
    ));
    let harness = Harness::start(nearby, detail.clone(), clock, DiscoveryConfig::default());

    let centre = Coordinate::new(37.5, 127.0);
    harness.handle.fetch_now(centre).expect("controller running");
    harness.settle_after(1).await;
    harness.handle.fetch_now(centre).expect("controller running");
    let snapshot = harness.settle_after(2).await;

    assert_eq!(snapshot.pharmacies.len(), 3);
    assert_eq!(detail.calls_for("A약국"), 1, "failed enrichment is not retried");
    assert_eq!(detail.calls_for("B약국"), 1);
    assert_eq!(detail.calls_for("C약국"), 1);
    assert!(
        snapshot
            .find("A약국")
            .is_some_and(|pharmacy| pharmacy.operating_hours.is_empty())
    );
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn single_token_address_is_listed_but_never_enriched(clock: Arc<MutableClock>) {
    let nearby = Arc::new(ScriptedNearbySource::scripted(vec![Ok(vec![summary(
        "세종약국", "세종",
    )])]));
    let detail =
        Arc::new(ScriptedDetailSource::default().with_hours("세종약국", every_day("0000", "2400")));
    let harness = Harness::start(nearby, detail.clone(), clock, DiscoveryConfig::default());

    harness
        .handle
        .fetch_now(Coordinate::new(36.48, 127.289))
        .expect("controller running");
    let snapshot = harness.settle_after(1).await;

    assert_eq!(detail.calls_for("세종약국"), 0);
    let listed = snapshot.find("세종약국").expect("pharmacy listed");
    assert!(listed.operating_hours.is_empty());
    assert!(!listed.is_open);
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn failed_nearby_fetch_keeps_existing_pharmacies(clock: Arc<MutableClock>) {
    let nearby = Arc::new(ScriptedNearbySource::scripted(vec![
        Ok(vec![summary("A약국", "서울 강남구 역삼동 1")]),
        Err(NearbySourceError::request_failed("offline")),
    ]));
    let harness = Harness::start(
        nearby,
        Arc::new(ScriptedDetailSource::default()),
        clock,
        DiscoveryConfig::default(),
    );

    let centre = Coordinate::new(37.5, 127.0);
    harness.handle.fetch_now(centre).expect("controller running");
    harness.settle_after(1).await;
    harness.handle.fetch_now(centre).expect("controller running");
    let snapshot = harness.settle_after(2).await;

    assert_eq!(snapshot.pharmacies.len(), 1);
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn nearby_requests_use_configured_radius(clock: Arc<MutableClock>) {
    let mut nearby = MockNearbyPharmacySource::new();
    nearby
        .expect_fetch_nearby()
        .withf(|request| request.radius_meters == 500 && request.latitude == 35.1796)
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let config = DiscoveryConfig {
        search_radius_meters: 500,
        ..DiscoveryConfig::default()
    };
    let harness = Harness::start(
        Arc::new(nearby),
        Arc::new(ScriptedDetailSource::default()),
        clock,
        config,
    );

    harness
        .handle
        .fetch_now(Coordinate::new(35.1796, 129.0756))
        .expect("controller running");
    let snapshot = harness.settle_after(1).await;
    assert!(snapshot.pharmacies.is_empty());
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn recenter_fetches_around_device(clock: Arc<MutableClock>) {
    let nearby = Arc::new(ScriptedNearbySource::default());
    let harness = Harness::start(
        nearby.clone(),
        Arc::new(ScriptedDetailSource::default()),
        clock,
        DiscoveryConfig::default(),
    );

    let home = Coordinate::new(37.5665, 126.978);
    harness.handle.device_located(home).expect("controller running");
    harness.settle_after(1).await;

    harness
        .handle
        .camera_moved(Coordinate::new(37.6, 127.1))
        .expect("controller running");
    harness.handle.recenter().expect("controller running");
    harness.settle_after(2).await;
    sleep(Duration::from_secs(3)).await;

    assert_eq!(nearby.call_count(), 2);
    assert_eq!(nearby.last_centre(), Some(home));
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn open_flags_follow_the_clock(clock: Arc<MutableClock>) {
    let mut hours = OperatingHours::new();
    hours.set(DaySlot::Weekday(Weekday::Mon), Boundary::Start, "0900");
    hours.set(DaySlot::Weekday(Weekday::Mon), Boundary::End, "1800");

    let nearby = Arc::new(ScriptedNearbySource::scripted(vec![Ok(vec![summary(
        "A약국",
        "서울 강남구 역삼동 1",
    )])]));
    let detail = Arc::new(ScriptedDetailSource::default().with_hours("A약국", hours));
    let config = DiscoveryConfig {
        status_refresh_interval: Duration::from_secs(1),
        ..DiscoveryConfig::default()
    };
    let harness = Harness::start(nearby, detail, clock.clone(), config);

    harness
        .handle
        .fetch_now(Coordinate::new(37.5, 127.0))
        .expect("controller running");
    let snapshot = harness.settle_after(1).await;
    assert!(snapshot.find("A약국").is_some_and(|p| p.is_open));

    clock.advance(TimeDelta::hours(7));
    let closed = timeout(
        WAIT_LIMIT,
        harness
            .handle
            .wait_for(|snapshot| snapshot.find("A약국").is_some_and(|p| !p.is_open)),
    )
    .await
    .expect("refresh tick should close the pharmacy")
    .expect("controller running");
    assert!(!closed.pharmacies.is_empty());
    harness.stop().await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn handle_reports_stopped_controller(clock: Arc<MutableClock>) {
    let harness = Harness::start(
        Arc::new(ScriptedNearbySource::default()),
        Arc::new(ScriptedDetailSource::default()),
        clock,
        DiscoveryConfig::default(),
    );
    let handle = harness.handle.clone();
    harness.stop().await;

    assert_eq!(
        handle.fetch_now(Coordinate::new(37.5, 127.0)),
        Err(DiscoveryStopped)
    );
}
