//! Area reference data and the area-code extraction rule.
//!
//! Call records reach the dashboard with the area code embedded in either the
//! customer's dedicated `location` column or the tail of the free-text
//! `service_address`. Both query paths go through [`AreaCode::from_sources`]
//! (and the matching SQL expression in `outage-db`) so they can never disagree
//! about which area a call belongs to.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Trailing run of five ASCII digits, ignoring trailing whitespace.
static TRAILING_AREA_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{5})\s*$").expect("valid regex"));

/// A validated five-digit area code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AreaCode(String);

impl AreaCode {
    /// Parse a bare area code. Surrounding whitespace is ignored; anything
    /// other than exactly five ASCII digits is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAreaCode`] for malformed input.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.len() == 5 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::InvalidAreaCode(raw.to_string()))
        }
    }

    /// Extract the area code embedded at the end of a free-text field such as
    /// a service address (`"12 Main St, Hartford, CT 06105"`).
    #[must_use]
    pub fn extract(source: &str) -> Option<Self> {
        TRAILING_AREA_CODE
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    /// Resolve a customer's area code from its two source columns.
    ///
    /// The dedicated `location` column wins; `service_address` is the fallback.
    #[must_use]
    pub fn from_sources(location: Option<&str>, service_address: Option<&str>) -> Option<Self> {
        location
            .and_then(Self::extract)
            .or_else(|| service_address.and_then(Self::extract))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AreaCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AreaCode> for String {
    fn from(value: AreaCode) -> Self {
        value.0
    }
}

/// Static map position and display name for a known area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaCoordinate {
    pub area_code: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: &'static str,
}

const fn area(
    area_code: &'static str,
    latitude: f64,
    longitude: f64,
    display_name: &'static str,
) -> AreaCoordinate {
    AreaCoordinate {
        area_code,
        latitude,
        longitude,
        display_name,
    }
}

/// Connecticut service areas shown on the outage map, sorted by area code.
pub static AREA_COORDINATES: &[AreaCoordinate] = &[
    area("06001", 41.8798, -72.7479, "Avon"),
    area("06002", 41.8626, -72.5856, "Bloomfield"),
    area("06010", 41.7579, -72.8403, "Bristol"),
    area("06016", 41.5565, -72.9289, "Broad Brook"),
    area("06032", 41.8584, -72.7509, "Farmington"),
    area("06033", 41.8834, -72.7826, "Glastonbury"),
    area("06035", 41.6612, -72.8120, "Granby"),
    area("06042", 41.7798, -72.5187, "Manchester"),
    area("06043", 41.7959, -72.5270, "Bolton"),
    area("06051", 41.9009, -72.5859, "New Britain"),
    area("06052", 41.9298, -72.5598, "New Britain"),
    area("06053", 41.8787, -72.5620, "New Britain"),
    area("06067", 41.8590, -72.4959, "Rocky Hill"),
    area("06070", 41.8462, -72.7931, "Simsbury"),
    area("06074", 41.7337, -72.8326, "South Windsor"),
    area("06078", 41.6987, -72.8648, "Suffield"),
    area("06082", 41.8959, -72.7759, "Enfield"),
    area("06088", 41.7798, -72.7187, "East Granby"),
    area("06095", 41.9431, -72.5620, "Windsor"),
    area("06096", 41.8387, -72.6437, "Windsor Locks"),
    area("06105", 41.7662, -72.7009, "Hartford"),
    area("06106", 41.7548, -72.6887, "Hartford"),
    area("06107", 41.7598, -72.7220, "West Hartford"),
    area("06108", 41.7726, -72.7498, "East Hartford"),
    area("06109", 41.7337, -72.7187, "Wethersfield"),
    area("06110", 41.7448, -72.7276, "West Hartford"),
    area("06111", 41.7137, -72.7387, "Newington"),
    area("06117", 41.7859, -72.7109, "West Hartford"),
    area("06118", 41.7909, -72.7598, "East Hartford"),
    area("06119", 41.7709, -72.6687, "West Hartford"),
    area("06226", 41.8598, -72.2309, "Willimantic"),
];

/// Look up the map coordinate for an area code.
#[must_use]
pub fn lookup_area(area_code: &str) -> Option<&'static AreaCoordinate> {
    AREA_COORDINATES
        .binary_search_by(|entry| entry.area_code.cmp(area_code))
        .ok()
        .map(|idx| &AREA_COORDINATES[idx])
}
