//! Streaming decoder for the open-data pharmacy listing.
//!
//! One accumulator record is filled while inside an `<item>` element and
//! pushed when the element closes. Unknown elements are ignored; unparsable
//! coordinates keep the value already in the accumulator.
//!
//! Key and quota failures arrive as HTTP 200 with an `OpenAPI_ServiceResponse`
//! envelope; its `returnReasonCode` is read as the page result code.

use chrono::Weekday;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::warn;

use crate::domain::ports::{DetailSourceError, PharmacyDetailRecord};
use crate::domain::{Boundary, DaySlot};

const ITEM: &str = "item";
const SUCCESS_CODE: &str = "00";

/// Header and records decoded from one response page.
#[derive(Debug, Default, PartialEq)]
pub(super) struct DetailPage {
    pub(super) result_code: Option<String>,
    pub(super) result_message: Option<String>,
    pub(super) records: Vec<PharmacyDetailRecord>,
}

impl DetailPage {
    /// Records of a page whose header reports success (or carries no code).
    pub(super) fn into_records(self) -> Result<Vec<PharmacyDetailRecord>, DetailSourceError> {
        match self.result_code.as_deref() {
            None | Some(SUCCESS_CODE) => Ok(self.records),
            Some(code) => Err(DetailSourceError::decoding(format!(
                "result code {code}: {}",
                self.result_message.as_deref().unwrap_or("no message")
            ))),
        }
    }
}

/// Decode an XML page.
///
/// A malformed document fails only when no record completed before the
/// error; otherwise the completed records are kept.
pub(super) fn parse_detail_page(body: &[u8]) -> Result<DetailPage, DetailSourceError> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut page = DetailPage::default();
    let mut current: Option<PharmacyDetailRecord> = None;
    let mut element: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if name == ITEM {
                    current = Some(PharmacyDetailRecord::default());
                }
                element = Some(name);
            }
            Ok(Event::End(end)) => {
                if end.local_name().as_ref() == ITEM.as_bytes() {
                    page.records.extend(current.take());
                }
                element = None;
            }
            Ok(Event::Text(text)) => {
                let value = match text.unescape() {
                    Ok(value) => value.into_owned(),
                    Err(error) => return finish_on_error(page, &error),
                };
                apply_text(&mut page, current.as_mut(), element.as_deref(), value);
            }
            Ok(Event::CData(data)) => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                apply_text(&mut page, current.as_mut(), element.as_deref(), value);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => return finish_on_error(page, &error),
        }
        buf.clear();
    }
    Ok(page)
}

fn finish_on_error(
    page: DetailPage,
    error: &quick_xml::Error,
) -> Result<DetailPage, DetailSourceError> {
    if page.records.is_empty() {
        return Err(DetailSourceError::xml_parse_failed(error.to_string()));
    }
    warn!(
        records = page.records.len(),
        %error,
        "pharmacy detail XML truncated; keeping completed records"
    );
    Ok(page)
}

fn apply_text(
    page: &mut DetailPage,
    record: Option<&mut PharmacyDetailRecord>,
    element: Option<&str>,
    value: String,
) {
    let Some(element) = element else { return };
    match (record, element) {
        (None, "resultCode" | "returnReasonCode") => page.result_code = Some(value),
        (None, "resultMsg" | "errMsg" | "returnAuthMsg") => page.result_message = Some(value),
        (None, _) => {}
        (Some(record), field) => apply_field(record, field, value),
    }
}

fn apply_field(record: &mut PharmacyDetailRecord, field: &str, value: String) {
    match field {
        "dutyName" => record.name = value,
        "dutyAddr" => record.address = value,
        "dutyTel1" => record.phone = value,
        "wgs84Lat" => {
            if let Ok(latitude) = value.trim().parse() {
                record.latitude = latitude;
            }
        }
        "wgs84Lon" => {
            if let Ok(longitude) = value.trim().parse() {
                record.longitude = longitude;
            }
        }
        _ => {
            if let Some((slot, boundary)) = hours_field(field) {
                record.operating_hours.set(slot, boundary, value);
            }
        }
    }
}

/// Map `dutyTime{1-8}{s,c}` to its slot: 1-7 are Monday to Sunday and 8 is
/// public holidays; `s` opens and `c` closes.
fn hours_field(field: &str) -> Option<(DaySlot, Boundary)> {
    let mut suffix = field.strip_prefix("dutyTime")?.chars();
    let day = suffix.next()?;
    let boundary = match suffix.next()? {
        's' => Boundary::Start,
        'c' => Boundary::End,
        _ => return None,
    };
    if suffix.next().is_some() {
        return None;
    }
    let slot = match day {
        '1' => DaySlot::Weekday(Weekday::Mon),
        '2' => DaySlot::Weekday(Weekday::Tue),
        '3' => DaySlot::Weekday(Weekday::Wed),
        '4' => DaySlot::Weekday(Weekday::Thu),
        '5' => DaySlot::Weekday(Weekday::Fri),
        '6' => DaySlot::Weekday(Weekday::Sat),
        '7' => DaySlot::Weekday(Weekday::Sun),
        '8' => DaySlot::Holiday,
        _ => return None,
    };
    Some((slot, boundary))
}
