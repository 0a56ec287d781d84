//! User-submitted geolocation records

use chrono::{DateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Coordinates;

/// Address stored when the picker could not reverse-geocode the point
pub const UNKNOWN_ADDRESS: &str = "Unknown address";

/// A picked location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub coordinates: Coordinates,
}

/// One persisted location entry
///
/// `ip` and `timestamp` are stamped by the server on append. Entries written
/// through a wholesale replace keep whatever the caller sent, which may be
/// neither.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub location: Location,
}

impl LocationRecord {
    /// Build a fresh record stamped with the caller address and an ISO-8601 time
    pub fn stamped<Tz>(ip: impl Into<String>, location: Location, at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let address = location
            .address
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());

        Self {
            ip: Some(ip.into()),
            timestamp: Some(at.to_rfc3339_opts(SecondsFormat::Micros, false)),
            location: Location {
                address: Some(address),
                coordinates: location.coordinates,
            },
        }
    }
}

/// Keep the entries with a usable `location.coordinates`, in order and exactly
/// as they were stored
pub fn filter_valid_entries<'a, I>(entries: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    entries
        .into_iter()
        .filter(|entry| crate::validation::has_location_coordinates(entry))
        .cloned()
        .collect()
}
