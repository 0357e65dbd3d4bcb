mod rten_engine;

use std::path::Path;
use std::sync::Arc;

use crate::config::ModelPaths;
use crate::error::{DiagnosisError, Result};
use crate::image_loader::TargetSize;
use crate::tensor::Tensor;

pub use rten_engine::{RtenEngine, check_declared_input, to_model_input};

/// Output of a single classifier invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index: usize,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Build a prediction from a probability vector, picking the argmax.
    ///
    /// NaN or infinite scores are rejected as an inference failure.
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self> {
        if let Some(idx) = probabilities.iter().position(|p| !p.is_finite()) {
            return Err(DiagnosisError::Inference(format!(
                "non-finite score {} at class index {}",
                probabilities[idx], idx
            )));
        }
        let class_index = argmax(&probabilities).ok_or_else(|| DiagnosisError::ShapeMismatch {
            expected: vec![1],
            actual: vec![0],
        })?;
        Ok(Self {
            class_index,
            probabilities,
        })
    }
}

/// Index of the largest value; the lowest index wins ties.
///
/// A NaN counts as the maximum, so the first NaN wins.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            return Some(idx);
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// A loaded classifier. Implementations must be safe to share between threads
/// and must not mutate state on `predict`.
pub trait InferenceEngine: Send + Sync {
    /// Map a batched input tensor onto a class prediction.
    fn predict(&self, batched: &Tensor) -> Result<Prediction>;

    /// Human-readable model name (used in logs and errors)
    fn name(&self) -> &str;
}

/// The four classifiers of the cascade, loaded once at startup.
#[derive(Clone)]
pub struct ModelSet {
    pub binary: Arc<dyn InferenceEngine>,
    pub benign: Arc<dyn InferenceEngine>,
    pub malignant: Arc<dyn InferenceEngine>,
    pub grade: Arc<dyn InferenceEngine>,
}

impl ModelSet {
    /// Load every model artifact. Any failure is fatal for the process.
    pub fn load(paths: &ModelPaths, target: TargetSize) -> Result<Self> {
        let input_shape = target.batched_shape();
        let load = |name: &str, path: &Path| -> Result<Arc<dyn InferenceEngine>> {
            let engine: Arc<dyn InferenceEngine> =
                Arc::new(RtenEngine::load(name, path, input_shape.clone())?);
            Ok(engine)
        };

        let models = Self {
            binary: load("binary", paths.binary.as_path())?,
            benign: load("benign", paths.benign.as_path())?,
            malignant: load("malignant", paths.malignant.as_path())?,
            grade: load("grade", paths.grade.as_path())?,
        };
        log::info!("Loaded 4 classifiers (input shape {:?})", input_shape);
        Ok(models)
    }
}

impl std::fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSet")
            .field("binary", &self.binary.name())
            .field("benign", &self.benign.name())
            .field("malignant", &self.malignant.name())
            .field("grade", &self.grade.name())
            .finish()
    }
}
