//! HTTP handler for farm solution generation

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use shared::{SolutionRequest, SolutionResponse};

use crate::error::{json_object, AppResult};
use crate::AppState;

/// Generate advice for a farm problem
pub async fn generate_solution(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<SolutionResponse>> {
    let Json(body) = body?;
    let request = SolutionRequest::from_json(&json_object(body)?)?;

    let response = state.solutions.generate(&request).await?;
    Ok(Json(response))
}
