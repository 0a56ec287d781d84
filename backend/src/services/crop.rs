//! Crop recommendation backed by a pre-trained classifier
//!
//! The classifier is a gradient boosted tree ensemble trained offline with
//! XGBoost (`multi:softprob`) and exported as a JSON tree dump with the base
//! score on its first line. Class labels are kept next to it as a JSON array,
//! in the order the model was trained with. Inference is done by `gbdt`.

use gbdt::decision_tree::{Data, ValueType};
use gbdt::gradient_boost::GBDT;
use serde_json::Value;
use shared::{rank_top, to_percentage, CropFeatures, CropPrediction, TOP_RECOMMENDATIONS};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of model inputs
pub const FEATURE_COUNT: usize = 7;

/// XGBoost objective the tree dump was trained with
pub const OBJECTIVE: &str = "multi:softprob";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed tree dump {path}: {message}")]
    Format { path: PathBuf, message: String },

    #[error("failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("invalid model: {0}")]
    Invalid(String),
}

/// Predict / predict-probability contract of a multi-class classifier
pub trait CropClassifier: Send + Sync {
    /// Class labels in model order
    fn classes(&self) -> &[String];

    /// Probability of each class, aligned with `classes`
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Vec<f64>;

    /// Most probable class; the first one wins a tie
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Option<String> {
        let probabilities = self.predict_proba(features);
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in probabilities.iter().copied().enumerate() {
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((i, p));
            }
        }
        best.and_then(|(i, _)| self.classes().get(i).cloned())
    }
}

/// XGBoost multi-class model evaluated by `gbdt`
pub struct BoostedTreesModel {
    classes: Vec<String>,
    booster: GBDT,
}

impl BoostedTreesModel {
    /// Load the tree dump at `dump_path` and its labels from `classes_path`
    pub fn load(dump_path: &Path, classes_path: &Path) -> Result<Self, ModelError> {
        let classes = load_classes(classes_path)?;

        let dump = std::fs::read_to_string(dump_path).map_err(|source| ModelError::Io {
            path: dump_path.to_path_buf(),
            source,
        })?;
        check_dump(dump_path, &dump, classes.len())?;

        let file = dump_path.to_str().ok_or_else(|| {
            ModelError::Invalid(format!("model path {} is not UTF-8", dump_path.display()))
        })?;
        let booster = GBDT::from_xgboost_dump(file, OBJECTIVE).map_err(|e| ModelError::Load {
            path: dump_path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self { classes, booster })
    }
}

impl CropClassifier for BoostedTreesModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let sample = Data::new_test_data(
            features.iter().map(|&v| v as ValueType).collect(),
            None,
        );
        let (_, probabilities) = self
            .booster
            .predict_multiclass(&vec![sample], self.classes.len());

        probabilities
            .into_iter()
            .next()
            .map(|row| row.into_iter().map(|p| p as f64).collect())
            .unwrap_or_default()
    }
}

/// Read the label file: a JSON array of distinct, non-empty crop names
fn load_classes(path: &Path) -> Result<Vec<String>, ModelError> {
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let classes: Vec<String> = serde_json::from_slice(&bytes).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if classes.is_empty() {
        return Err(ModelError::Invalid(format!("{} lists no classes", path.display())));
    }
    let mut seen = HashSet::new();
    for class in &classes {
        if class.trim().is_empty() || !seen.insert(class.as_str()) {
            return Err(ModelError::Invalid(format!(
                "{} has a blank or repeated class {:?}",
                path.display(),
                class
            )));
        }
    }
    Ok(classes)
}

/// Check the dump layout before `gbdt` reads it: one tree per class per
/// boosting round, splitting only on the seven inputs
fn check_dump(path: &Path, dump: &str, classes: usize) -> Result<(), ModelError> {
    let malformed = |message: String| ModelError::Format {
        path: path.to_path_buf(),
        message,
    };

    let (base_score, trees) = dump
        .split_once('\n')
        .ok_or_else(|| malformed("expected a base score line followed by the trees".into()))?;
    base_score
        .trim()
        .parse::<ValueType>()
        .map_err(|_| malformed(format!("invalid base score {:?}", base_score.trim())))?;

    let trees: Vec<Value> = serde_json::from_str(trees).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if trees.is_empty() || trees.len() % classes != 0 {
        return Err(malformed(format!(
            "{} trees cannot be split evenly across {} classes",
            trees.len(),
            classes
        )));
    }

    trees.iter().try_for_each(check_node).map_err(malformed)
}

fn check_node(node: &Value) -> Result<(), String> {
    if node.get("leaf").is_some_and(Value::is_number) {
        return Ok(());
    }

    let id = node.get("nodeid").cloned().unwrap_or(Value::Null);
    let feature = node
        .get("split")
        .and_then(Value::as_u64)
        .ok_or_else(|| format!("node {} has no numeric split feature", id))?;
    if feature >= FEATURE_COUNT as u64 {
        return Err(format!(
            "node {} splits on feature {}, the model takes {}",
            id, feature, FEATURE_COUNT
        ));
    }

    match node.get("children").and_then(Value::as_array) {
        Some(children) if children.len() == 2 => children.iter().try_for_each(check_node),
        _ => Err(format!("node {} must have exactly two children", id)),
    }
}

/// Wraps a loaded classifier behind the recommendation contract
pub struct CropRecommender {
    model: Box<dyn CropClassifier>,
}

impl CropRecommender {
    /// Wrap a classifier; it must know at least as many classes as are ranked
    pub fn new(model: impl CropClassifier + 'static) -> Result<Self, ModelError> {
        let classes = model.classes().len();
        if classes < TOP_RECOMMENDATIONS {
            return Err(ModelError::Invalid(format!(
                "model knows {} classes, at least {} are required",
                classes, TOP_RECOMMENDATIONS
            )));
        }
        Ok(Self {
            model: Box::new(model),
        })
    }

    /// Load the tree dump and its class labels
    pub fn load(dump_path: &Path, classes_path: &Path) -> Result<Self, ModelError> {
        let model = BoostedTreesModel::load(dump_path, classes_path)?;
        let recommender = Self::new(model)?;
        tracing::info!(
            path = %dump_path.display(),
            classes = recommender.model.classes().len(),
            "Crop recommendation model loaded"
        );
        Ok(recommender)
    }

    pub fn classes(&self) -> &[String] {
        self.model.classes()
    }

    /// Best crop plus the top alternatives with their confidence
    pub fn recommend(&self, features: &CropFeatures) -> Result<CropPrediction, ModelError> {
        let x = features.as_array();
        let probabilities = self.model.predict_proba(&x);

        if probabilities.len() != self.classes().len() {
            return Err(ModelError::Invalid(format!(
                "model returned {} probabilities for {} classes",
                probabilities.len(),
                self.classes().len()
            )));
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::Invalid(
                "model returned a non-finite probability".into(),
            ));
        }

        let recommended_crop = self
            .model
            .predict(&x)
            .ok_or_else(|| ModelError::Invalid("model returned no prediction".into()))?;
        let best = probabilities.iter().copied().fold(0.0, f64::max);

        Ok(CropPrediction {
            recommended_crop,
            confidence: to_percentage(best),
            top_recommendations: rank_top(self.classes(), &probabilities, TOP_RECOMMENDATIONS),
        })
    }
}
