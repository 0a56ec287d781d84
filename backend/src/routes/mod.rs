//! Route definitions for the Agri Advisor platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// HTML pages
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home_page))
        .route("/chatbot", get(handlers::chatbot_page))
        .route("/crop-recommendation", get(handlers::crop_recommendation_page))
        .route("/location-picker", get(handlers::location_picker_page))
}

/// JSON API, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/get_options/:language", get(handlers::get_options))
        .route("/generate_solution", post(handlers::generate_solution))
        .route("/recommend-crop", post(handlers::recommend_crop))
        .merge(location_routes())
}

/// Location store routes
fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/process-location", post(handlers::process_location))
        .route("/get-locations", get(handlers::get_locations))
        .route("/replace-locations", post(handlers::replace_locations))
        .route("/clear-locations", post(handlers::clear_locations))
}
