//! HTTP handler for crop recommendation

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    Json,
};
use serde_json::Value;
use shared::{location_from_value, required, CropFeatures, CropPrediction};
use std::net::SocketAddr;

use crate::error::{json_object, AppError, AppResult};
use crate::handlers::client_ip;
use crate::AppState;

/// Recommend crops for the submitted soil and climate readings
///
/// A `location` in the body is recorded in the location store on the side;
/// failing to record it never fails the recommendation.
pub async fn recommend_crop(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<CropPrediction>> {
    let Json(body) = body?;
    let body = json_object(body)?;
    let features = CropFeatures::from_json(&body)?;

    if let Some(location) = required(&body, "location") {
        record_location(&state, client_ip(connect_info), location).await;
    }

    let recommender = state
        .recommender
        .as_ref()
        .ok_or(AppError::ModelUnavailable)?;
    let prediction = recommender.recommend(&features)?;

    tracing::info!(
        crop = %prediction.recommended_crop,
        confidence = %prediction.confidence,
        "Crop recommended"
    );
    Ok(Json(prediction))
}

async fn record_location(state: &AppState, ip: String, location: &Value) {
    let location = match location_from_value(location) {
        Ok(location) => location,
        Err(e) => {
            tracing::warn!("Ignoring location sent with crop request: {}", e);
            return;
        }
    };
    if let Err(e) = state.locations.append(&ip, location).await {
        tracing::warn!("Error saving location: {}", e);
    }
}
