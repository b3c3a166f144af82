//! Province/district region keys used by the open-data lookup.

/// Country name that precedes the region in formatted placemark descriptions.
pub const COUNTRY_ANCHOR: &str = "대한민국";

/// Short province names mapped to the official names the open-data provider
/// expects.
const PROVINCE_NAMES: [(&str, &str); 17] = [
    ("서울", "서울특별시"),
    ("부산", "부산광역시"),
    ("대구", "대구광역시"),
    ("인천", "인천광역시"),
    ("광주", "광주광역시"),
    ("대전", "대전광역시"),
    ("울산", "울산광역시"),
    ("세종", "세종특별자치시"),
    ("경기", "경기도"),
    ("강원", "강원특별자치도"),
    ("충북", "충청북도"),
    ("충남", "충청남도"),
    ("전북", "전북특별자치도"),
    ("전남", "전라남도"),
    ("경북", "경상북도"),
    ("경남", "경상남도"),
    ("제주", "제주특별자치도"),
];

/// Map a short province name to its official form.
///
/// Unknown names, including names that are already official, pass through
/// unchanged.
///
/// # Examples
/// ```
/// use pharmacy_locator::domain::normalize_province;
///
/// assert_eq!(normalize_province("서울"), "서울특별시");
/// assert_eq!(normalize_province("Atlantis"), "Atlantis");
/// ```
pub fn normalize_province(name: &str) -> String {
    PROVINCE_NAMES
        .iter()
        .find(|(short, _)| *short == name)
        .map_or_else(|| name.to_owned(), |(_, official)| (*official).to_owned())
}

/// Two-component region key: province then district.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionKey {
    /// First-level region (특별시/광역시/도).
    pub province: String,
    /// Second-level region (시/군/구).
    pub district: String,
}

impl RegionKey {
    /// Build a key from explicit components.
    pub fn new(province: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            province: province.into(),
            district: district.into(),
        }
    }

    /// Build a key from the first two whitespace tokens of `text`.
    pub fn from_leading_tokens(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let province = tokens.next()?;
        let district = tokens.next()?;
        Some(Self::new(province, district))
    }

    /// Build a key from an already split `[province, district, ..]` list.
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        match parts {
            [province, district, ..] => Some(Self::new(province.as_str(), district.as_str())),
            _ => None,
        }
    }

    /// Copy of this key with the province in official form.
    pub fn normalized(&self) -> Self {
        Self {
            province: normalize_province(&self.province),
            district: self.district.clone(),
        }
    }
}

/// Extract the region that follows [`COUNTRY_ANCHOR`] in a formatted
/// placemark description.
///
/// Returns `None` when the anchor is absent or fewer than two tokens follow
/// it.
pub fn region_from_placemark(description: &str) -> Option<RegionKey> {
    let (_, after_anchor) = description.split_once(COUNTRY_ANCHOR)?;
    RegionKey::from_leading_tokens(after_anchor)
}
