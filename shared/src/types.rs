//! Common types used across the platform

use serde::{de, Deserialize, Deserializer, Serialize};

/// GPS coordinates as submitted by the location picker
///
/// Accepts `latitude`/`longitude`/`lon` and numeric strings on input but
/// always serializes as numeric `lat`/`lng`, which is what the map frontend
/// reads back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    #[serde(alias = "latitude", deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lon", deserialize_with = "coordinate")]
    pub lng: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid coordinate {:?}", text))),
    }
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite and inside WGS84 bounds
    pub fn is_plausible(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Language used when none is given in a solution request
pub const DEFAULT_LANGUAGE: &str = "English";
