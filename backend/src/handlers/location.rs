//! HTTP handlers for the location store

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use shared::parse_location_input;
use std::net::SocketAddr;

use crate::error::LocationError;
use crate::handlers::client_ip;
use crate::AppState;

/// Success body of the location endpoints
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl LocationResponse {
    fn success() -> Self {
        Self {
            status: "success",
            message: None,
            locations: None,
            count: None,
        }
    }
}

/// Store a location picked by the user
pub async fn process_location(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LocationResponse>, LocationError> {
    let Json(body) = body?;
    let location = parse_location_input(&body)?;

    state
        .locations
        .append(&client_ip(connect_info), location)
        .await
        .map_err(|e| LocationError::store("Failed to save location", e))?;

    Ok(Json(LocationResponse {
        message: Some("Location processed"),
        ..LocationResponse::success()
    }))
}

/// List every stored location with usable coordinates
pub async fn get_locations(State(state): State<AppState>) -> Json<LocationResponse> {
    let locations = state.locations.list_valid().await;
    Json(LocationResponse {
        count: Some(locations.len()),
        locations: Some(locations),
        ..LocationResponse::success()
    })
}

/// Replace the stored collection, keeping only entries with usable coordinates
pub async fn replace_locations(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LocationResponse>, LocationError> {
    let Json(body) = body?;
    let candidates = body
        .get("locations")
        .and_then(Value::as_array)
        .ok_or(LocationError::MissingLocations)?;

    let count = state
        .locations
        .replace_all(candidates)
        .await
        .map_err(|e| LocationError::store("Failed to save locations", e))?;

    Ok(Json(LocationResponse {
        count: Some(count),
        ..LocationResponse::success()
    }))
}

/// Remove every stored location
pub async fn clear_locations(
    State(state): State<AppState>,
) -> Result<Json<LocationResponse>, LocationError> {
    state
        .locations
        .clear()
        .await
        .map_err(|e| LocationError::store("Failed to clear locations", e))?;

    Ok(Json(LocationResponse::success()))
}
