//! Agri Advisor Platform - Backend
//!
//! Serves the farmer-facing pages and the JSON API behind them: crop
//! recommendation from soil and climate readings, AI-written solutions to
//! farm problems, and a map of locations submitted by users.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use crate::error::AppResult;
use crate::external::GeminiClient;
use crate::services::{CropRecommender, LocationStore, SolutionService, TextGenerator};

/// Application state shared across handlers
///
/// Built once at boot; nothing in it is mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub locations: LocationStore,
    /// `None` when the model failed to load
    pub recommender: Option<Arc<CropRecommender>>,
    pub solutions: Arc<SolutionService>,
}

impl AppState {
    /// Assemble the state from already-built collaborators
    pub fn new(
        config: Config,
        recommender: Option<CropRecommender>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let locations = LocationStore::new(config.storage.locations_file.clone());
        let solutions = SolutionService::new(generator, config.storage.solutions_dir.clone());

        Self {
            config: Arc::new(config),
            locations,
            recommender: recommender.map(Arc::new),
            solutions: Arc::new(solutions),
        }
    }

    /// Build the production state: load the classifier and configure the
    /// Gemini client
    ///
    /// A classifier that fails to load is logged and left out, so the rest of
    /// the API keeps working and recommendation requests get an error.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let recommender = match CropRecommender::load(&config.model.path, &config.model.classes_path) {
            Ok(recommender) => Some(recommender),
            Err(e) => {
                tracing::error!("Error loading crop model: {}", e);
                None
            }
        };

        let generator = GeminiClient::new(&config.gemini)?;
        Ok(Self::new(config, recommender, Arc::new(generator)))
    }

    /// Create the directories the server writes into
    pub async fn prepare_storage(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.config.storage.solutions_dir).await?;
        self.locations.ensure_parent_dir().await
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::page_routes())
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
