//! Run one discovery cycle around a coordinate and print the results.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use pharmacy_locator::config::LocatorSettings;
use pharmacy_locator::domain::{
    Coordinate, DiscoveryController, DiscoveryPorts, DiscoverySnapshot, Pharmacy,
};
use pharmacy_locator::outbound::kakao::{KakaoNearbySource, KakaoReverseGeocoder};
use pharmacy_locator::outbound::open_data::OpenDataPharmacySource;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `locate-pharmacies` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "locate-pharmacies",
    about = "List pharmacies around a coordinate with today's opening hours",
    version,
    allow_negative_numbers = true
)]
struct CliArgs {
    /// Search centre latitude (WGS84).
    #[arg(long, value_name = "degrees")]
    latitude: f64,
    /// Search centre longitude (WGS84).
    #[arg(long, value_name = "degrees")]
    longitude: f64,
    /// Seconds to wait for the search and hour lookups to finish.
    #[arg(long = "settle-timeout-secs", value_name = "secs", default_value_t = 30)]
    settle_timeout_secs: u64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = LocatorSettings::load_from_iter([OsString::from("locate-pharmacies")])
        .wrap_err("load PHARMACY_LOCATOR settings")?;
    let ports = build_ports(&settings)?;

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    let (controller, handle) =
        DiscoveryController::new(ports, Arc::clone(&clock), settings.discovery_config());
    let controller_task = tokio::spawn(controller.run());

    handle
        .fetch_now(Coordinate::new(args.latitude, args.longitude))
        .wrap_err("start discovery cycle")?;
    let settle_timeout = Duration::from_secs(args.settle_timeout_secs);
    let snapshot = match tokio::time::timeout(
        settle_timeout,
        handle.wait_for(|snapshot| snapshot.completed_fetches >= 1 && snapshot.is_settled()),
    )
    .await
    {
        Ok(settled) => settled.wrap_err("discovery controller stopped early")?,
        Err(_) => {
            let partial = handle.snapshot();
            warn!(
                pending_tasks = partial.pending_tasks,
                "timed out waiting for lookups; printing partial results"
            );
            partial
        }
    };

    print_snapshot(&snapshot, clock.local().weekday());

    handle.shutdown().wrap_err("stop discovery controller")?;
    controller_task
        .await
        .wrap_err("discovery controller task panicked")?;
    Ok(())
}

fn build_ports(settings: &LocatorSettings) -> Result<DiscoveryPorts> {
    let api_key = required(
        settings.nearby_api_key.as_deref(),
        "PHARMACY_LOCATOR_NEARBY_API_KEY",
    )?;
    let service_key = required(
        settings.detail_service_key.as_deref(),
        "PHARMACY_LOCATOR_DETAIL_SERVICE_KEY",
    )?;
    let timeout = settings.request_timeout();

    let nearby = KakaoNearbySource::new(
        settings.nearby_endpoint().wrap_err("parse nearby endpoint")?,
        api_key,
        timeout,
    )
    .wrap_err("build nearby search client")?
    .with_category_code(settings.nearby_category_code());
    let detail = OpenDataPharmacySource::new(
        settings.detail_endpoint().wrap_err("parse detail endpoint")?,
        service_key,
        timeout,
    )
    .wrap_err("build detail client")?;
    let geocoder = KakaoReverseGeocoder::new(
        settings
            .geocode_endpoint()
            .wrap_err("parse geocode endpoint")?,
        api_key,
        timeout,
    )
    .wrap_err("build geocoding client")?;

    Ok(DiscoveryPorts::new(
        Arc::new(nearby),
        Arc::new(detail),
        Arc::new(geocoder),
    ))
}

fn required<'a>(value: Option<&'a str>, variable: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(eyre!("{variable} must be set")),
    }
}

#[expect(clippy::print_stdout, reason = "operator CLI writes results to stdout")]
fn print_snapshot(snapshot: &DiscoverySnapshot, today: chrono::Weekday) {
    println!("pharmacies={}", snapshot.pharmacies.len());
    for pharmacy in &snapshot.pharmacies {
        println!("{}", describe(pharmacy, today));
    }
}

fn describe(pharmacy: &Pharmacy, today: chrono::Weekday) -> String {
    let schedule = pharmacy.operating_hours.schedule_for(today);
    let status = if pharmacy.is_open { "open" } else { "closed" };
    format!(
        "{name}\t{status}\t{start}-{end}\t{address}\t{phone}",
        name = pharmacy.name,
        start = schedule.start_display(),
        end = schedule.end_display(),
        address = pharmacy.address,
        phone = pharmacy.phone,
    )
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI helpers.

    use chrono::Weekday;
    use pharmacy_locator::domain::{Boundary, DaySlot};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::missing(None)]
    #[case::blank(Some("   "))]
    fn required_rejects_missing_values(#[case] value: Option<&str>) {
        let error = required(value, "PHARMACY_LOCATOR_NEARBY_API_KEY").expect_err("must fail");
        assert!(error.to_string().contains("PHARMACY_LOCATOR_NEARBY_API_KEY"));
    }

    #[rstest]
    fn describe_prints_todays_hours() {
        let mut pharmacy =
            Pharmacy::new("온누리약국", "서울 강남구 역삼동 825", 37.4979, 127.0276)
                .with_phone("02-555-0101");
        pharmacy
            .operating_hours
            .set(DaySlot::Weekday(Weekday::Tue), Boundary::Start, "0900");
        pharmacy
            .operating_hours
            .set(DaySlot::Weekday(Weekday::Tue), Boundary::End, "2100");

        assert_eq!(
            describe(&pharmacy, Weekday::Tue),
            "온누리약국\tclosed\t09:00-21:00\t서울 강남구 역삼동 825\t02-555-0101"
        );
        assert_eq!(
            describe(&pharmacy, Weekday::Wed),
            "온누리약국\tclosed\tno info-no info\t서울 강남구 역삼동 825\t02-555-0101"
        );
    }

    #[rstest]
    fn parses_coordinates() {
        let args = CliArgs::try_parse_from([
            "locate-pharmacies",
            "--latitude",
            "37.5665",
            "--longitude",
            "126.978",
        ])
        .expect("args parse");
        assert_eq!(args.settle_timeout_secs, 30);
        assert_eq!(args.latitude, 37.5665);
    }
}
