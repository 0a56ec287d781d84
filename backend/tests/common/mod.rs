//! Helpers shared by the integration tests

#![allow(dead_code)]

use agri_advisor_backend::config::{
    Config, GeminiConfig, ModelConfig, ServerConfig, StorageConfig,
};
use agri_advisor_backend::error::{AppError, AppResult};
use agri_advisor_backend::services::{CropRecommender, TextGenerator};
use agri_advisor_backend::{create_app, AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;

/// A fresh directory under the system temp dir
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("agri-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn test_config(root: &Path) -> Config {
    Config {
        environment: "test".into(),
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".into(),
        },
        storage: StorageConfig {
            locations_file: root.join("user_locations").join("locations.json"),
            solutions_dir: root.join("solutions"),
            templates_dir: root.join("templates"),
        },
        model: ModelConfig {
            path: root.join("crop_recommender.model"),
            classes_path: root.join("crop_classes.json"),
        },
        gemini: GeminiConfig {
            api_key: "test-key".into(),
            model: "gemini-1.5-pro".into(),
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 1,
        },
    }
}

/// Depth-1 XGBoost dump tree: `below` when `feature < threshold`, else `above`
pub fn stump(feature: usize, threshold: f64, below: f64, above: f64) -> Value {
    json!({
        "nodeid": 0, "depth": 0,
        "split": feature, "split_condition": threshold,
        "yes": 1, "no": 2, "missing": 1,
        "children": [
            {"nodeid": 1, "leaf": below},
            {"nodeid": 2, "leaf": above}
        ]
    })
}

/// Four crops, one tree each: potassium pushes towards chickpea, nitrogen
/// towards cotton, moderate humidity towards maize, rainfall towards rice
pub fn test_recommender() -> CropRecommender {
    let dir = scratch_dir();
    let dump = dir.join("crop_recommender.model");
    let classes = dir.join("crop_classes.json");

    let trees = vec![
        stump(2, 60.0, -1.0, 2.5),
        stump(0, 100.0, -0.5, 1.8),
        stump(4, 72.0, 1.0, 0.0),
        stump(6, 150.0, -1.0, 2.0),
    ];
    std::fs::write(&dump, format!("0.5\n{}", Value::Array(trees))).unwrap();
    std::fs::write(&classes, json!(["chickpea", "cotton", "maize", "rice"]).to_string()).unwrap();

    let recommender = CropRecommender::load(&dump, &classes).unwrap();
    let _ = std::fs::remove_dir_all(dir);
    recommender
}

/// Generator returning a fixed answer
pub struct CannedGenerator(pub &'static str);

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        Ok(self.0.to_string())
    }
}

/// Generator that always fails like an unreachable API
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        Err(AppError::Generation("Request failed: connection refused".into()))
    }
}

pub struct TestApp {
    pub root: PathBuf,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new(recommender: Option<CropRecommender>, generator: Arc<dyn TextGenerator>) -> Self {
        let root = scratch_dir();
        let state = AppState::new(test_config(&root), recommender, generator);
        let router = create_app(state.clone());
        Self {
            root,
            state,
            router,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            Some(test_recommender()),
            Arc::new(CannedGenerator("Apply neem oil weekly.")),
        )
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.call(request).await
    }

    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
