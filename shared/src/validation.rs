//! Request validation helpers
//!
//! Request bodies arrive as loosely typed JSON from browser forms, so presence
//! is checked field by field before anything is deserialized. A JSON `null`
//! counts as missing.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::Location;

/// Fetch a field, treating `null` as absent
pub fn required<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

/// Accept JSON numbers and numeric strings, rejecting non-finite values
pub fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Accept JSON strings and scalars as text; blank strings are rejected
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// An entry has a non-empty `location` object holding a non-empty `coordinates` value
pub fn has_location_coordinates(entry: &Value) -> bool {
    entry
        .get("location")
        .filter(|l| is_present(l))
        .and_then(|l| l.get("coordinates"))
        .is_some_and(is_present)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LocationInputError {
    #[error("Missing required location data")]
    Missing,

    #[error("Invalid location coordinates")]
    InvalidCoordinates,
}

/// Validate a `{location: {address?, coordinates}}` submission
pub fn parse_location_input(body: &Value) -> Result<Location, LocationInputError> {
    if !has_location_coordinates(body) {
        return Err(LocationInputError::Missing);
    }
    location_from_value(&body["location"])
}

/// Validate a bare `{address?, coordinates}` object
pub fn location_from_value(value: &Value) -> Result<Location, LocationInputError> {
    let location: Location = serde_json::from_value(value.clone())
        .map_err(|_| LocationInputError::InvalidCoordinates)?;
    if !location.coordinates.is_plausible() {
        return Err(LocationInputError::InvalidCoordinates);
    }
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;
    use serde_json::json;

    #[test]
    fn test_required_treats_null_as_missing() {
        let body = json!({"a": 1, "b": null});
        let map = body.as_object().unwrap();
        assert!(required(map, "a").is_some());
        assert!(required(map, "b").is_none());
        assert!(required(map, "c").is_none());
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value(&json!(4)), Some(4.0));
        assert_eq!(numeric_value(&json!(" 6.5 ")), Some(6.5));
        assert_eq!(numeric_value(&json!("NaN")), None);
        assert_eq!(numeric_value(&json!("inf")), None);
        assert_eq!(numeric_value(&json!(true)), None);
        assert_eq!(numeric_value(&json!([1])), None);
    }

    #[test]
    fn test_text_value() {
        assert_eq!(text_value(&json!(" Clay Soil ")), Some("Clay Soil".to_string()));
        assert_eq!(text_value(&json!(12)), Some("12".to_string()));
        assert_eq!(text_value(&json!("   ")), None);
        assert_eq!(text_value(&json!({"x": 1})), None);
    }

    #[test]
    fn test_has_location_coordinates() {
        assert!(has_location_coordinates(&json!({"location": {"coordinates": {"lat": 0, "lng": 0}}})));
        assert!(!has_location_coordinates(&json!({"location": null})));
        assert!(!has_location_coordinates(&json!({"location": {}})));
        assert!(!has_location_coordinates(&json!({"location": {"coordinates": null}})));
        assert!(!has_location_coordinates(&json!({"location": {"coordinates": {}}})));
        assert!(!has_location_coordinates(&json!({})));
        assert!(!has_location_coordinates(&json!(null)));
    }

    #[test]
    fn test_parse_location_input() {
        let body = json!({"location": {"address": "Guntur", "coordinates": {"lat": 16.3, "lng": 80.4}}});
        let location = parse_location_input(&body).unwrap();
        assert_eq!(location.address.as_deref(), Some("Guntur"));
        assert_eq!(location.coordinates, Coordinates::new(16.3, 80.4));

        let body = json!({"location": {"coordinates": {"lat": "16.3", "lng": "80.4"}}});
        assert_eq!(
            parse_location_input(&body).unwrap().coordinates,
            Coordinates::new(16.3, 80.4)
        );

        assert_eq!(
            parse_location_input(&json!({"location": {"address": "x"}})),
            Err(LocationInputError::Missing)
        );
        assert_eq!(
            parse_location_input(&json!({"location": {"coordinates": {"lat": "north"}}})),
            Err(LocationInputError::InvalidCoordinates)
        );
        assert_eq!(
            parse_location_input(&json!({"location": {"coordinates": {"lat": 120, "lng": 0}}})),
            Err(LocationInputError::InvalidCoordinates)
        );
    }
}
