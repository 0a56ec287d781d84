//! Page handlers
//!
//! Pages are static HTML files read from the configured templates directory on
//! every request, so they can be edited without a restart.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::AppState;

pub async fn home_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "index.html").await
}

pub async fn chatbot_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "chatbot.html").await
}

pub async fn crop_recommendation_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "crop_recommend.html").await
}

pub async fn location_picker_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "location_picker.html").await
}

async fn serve_page(state: &AppState, name: &str) -> Response {
    let path = state.config.storage.templates_dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to read page {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "Page not found").into_response()
        }
    }
}
