//! DTOs for decoding Kakao Local JSON responses.
//!
//! Kakao reports coordinates as decimal strings. Unparsable values become
//! `0.0` rather than failing the whole batch.

use serde::Deserialize;

use crate::domain::Pharmacy;

#[derive(Debug, Deserialize)]
pub(super) struct CategorySearchDto {
    #[serde(default)]
    pub(super) documents: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaceDto {
    pub(super) place_name: String,
    #[serde(default)]
    pub(super) x: String,
    #[serde(default)]
    pub(super) y: String,
    #[serde(default)]
    pub(super) address_name: String,
    #[serde(default)]
    pub(super) road_address_name: String,
    #[serde(default)]
    pub(super) phone: String,
}

impl CategorySearchDto {
    pub(super) fn into_domain_pharmacies(self) -> Vec<Pharmacy> {
        self.documents
            .into_iter()
            .map(PlaceDto::into_domain_pharmacy)
            .collect()
    }
}

impl PlaceDto {
    fn into_domain_pharmacy(self) -> Pharmacy {
        Pharmacy::new(
            self.place_name,
            self.address_name,
            parse_coordinate(&self.y),
            parse_coordinate(&self.x),
        )
        .with_road_address(self.road_address_name)
        .with_phone(self.phone)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CoordToAddressDto {
    #[serde(default)]
    pub(super) documents: Vec<AddressDocumentDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddressDocumentDto {
    pub(super) address: Option<AddressNameDto>,
    pub(super) road_address: Option<AddressNameDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddressNameDto {
    pub(super) address_name: String,
}

impl CoordToAddressDto {
    /// Formatted address of the first document, lot-number form preferred.
    pub(super) fn first_address(self) -> Option<String> {
        self.documents.into_iter().find_map(|document| {
            document
                .address
                .or(document.road_address)
                .map(|address| address.address_name)
        })
    }
}

fn parse_coordinate(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_places_with_string_coordinates() {
        let body = r#"{
            "meta": { "total_count": 2 },
            "documents": [
                {
                    "place_name": "온누리약국",
                    "x": "127.0276",
                    "y": "37.4979",
                    "address_name": "서울 강남구 역삼동 825",
                    "road_address_name": "서울 강남구 강남대로 396",
                    "phone": "02-555-0101"
                },
                { "place_name": "좌표없는약국", "x": "n/a", "address_name": "부산 중구" }
            ]
        }"#;

        let decoded: CategorySearchDto = serde_json::from_str(body).expect("JSON should decode");
        let pharmacies = decoded.into_domain_pharmacies();

        assert_eq!(pharmacies.len(), 2);
        assert_eq!(pharmacies[0].longitude, 127.0276);
        assert_eq!(pharmacies[0].latitude, 37.4979);
        assert_eq!(pharmacies[0].road_address, "서울 강남구 강남대로 396");
        assert_eq!(pharmacies[0].city, ["서울", "강남구"]);
        assert_eq!(pharmacies[1].longitude, 0.0);
        assert_eq!(pharmacies[1].latitude, 0.0);
        assert!(pharmacies[1].phone.is_empty());
    }

    #[test]
    fn prefers_lot_number_address() {
        let body = r#"{
            "documents": [{
                "road_address": { "address_name": "서울 중구 세종대로 110" },
                "address": { "address_name": "서울 중구 태평로1가 31" }
            }]
        }"#;
        let decoded: CoordToAddressDto = serde_json::from_str(body).expect("JSON should decode");
        assert_eq!(decoded.first_address().as_deref(), Some("서울 중구 태평로1가 31"));
    }

    #[test]
    fn empty_geocode_response_has_no_address() {
        let decoded: CoordToAddressDto =
            serde_json::from_str(r#"{"documents": []}"#).expect("JSON should decode");
        assert_eq!(decoded.first_address(), None);
    }
}
