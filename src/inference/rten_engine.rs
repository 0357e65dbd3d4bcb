use std::path::{Path, PathBuf};

use rten::{Dimension, Model};
use rten_tensor::prelude::*;

use crate::error::{DiagnosisError, Result};
use crate::inference::{InferenceEngine, Prediction};
use crate::tensor::Tensor;

/// Classifier backed by an `rten` model file.
pub struct RtenEngine {
    name: String,
    path: PathBuf,
    input_shape: Vec<usize>,
    model: Model,
}

impl RtenEngine {
    /// Load the model at `path`, expecting inputs of `input_shape`.
    ///
    /// Fails with `ShapeMismatch` when the model declares a fixed input
    /// shape that disagrees with `input_shape`.
    pub fn load(name: &str, path: &Path, input_shape: Vec<usize>) -> Result<Self> {
        let unavailable = |reason: String| DiagnosisError::ModelUnavailable {
            model: name.to_string(),
            reason,
        };

        if !path.exists() {
            return Err(unavailable(format!("model file not found: {}", path.display())));
        }

        let model = Model::load_file(path)
            .map_err(|e| unavailable(format!("failed to load {}: {}", path.display(), e)))?;

        let declared = declared_input_dims(&model);
        if let Some(declared) = &declared {
            check_declared_input(declared, &input_shape)?;
        } else {
            log::debug!("{} model does not declare its input shape", name);
        }

        log::info!("Loaded {} model from {}", name, path.display());

        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            input_shape,
            model,
        })
    }
}

/// Input dims of the model's first input; `None` entries are symbolic.
fn declared_input_dims(model: &Model) -> Option<Vec<Option<usize>>> {
    let input_id = *model.input_ids().first()?;
    let shape = model.node_info(input_id)?.shape()?;
    Some(
        shape
            .iter()
            .map(|dim| match dim {
                Dimension::Fixed(size) => Some(*size),
                Dimension::Symbolic(_) => None,
            })
            .collect(),
    )
}

/// Check a model's declared input dims against the configured input shape.
///
/// Symbolic dims (`None`) accept any size.
pub fn check_declared_input(declared: &[Option<usize>], configured: &[usize]) -> Result<()> {
    let matches = declared.len() == configured.len()
        && declared
            .iter()
            .zip(configured)
            .all(|(dim, &size)| dim.is_none_or(|fixed| fixed == size));
    if matches {
        return Ok(());
    }
    Err(DiagnosisError::ShapeMismatch {
        expected: declared
            .iter()
            .enumerate()
            .map(|(i, dim)| dim.unwrap_or_else(|| configured.get(i).copied().unwrap_or(0)))
            .collect(),
        actual: configured.to_vec(),
    })
}

/// Convert a batched tensor into the runtime's input type, rejecting
/// wrongly shaped inputs before the model is touched.
pub fn to_model_input(expected: &[usize], batched: &Tensor) -> Result<rten_tensor::Tensor<f32>> {
    batched.expect_shape(expected)?;
    Ok(rten_tensor::Tensor::from_data(
        batched.shape(),
        batched.data().to_vec(),
    ))
}

impl InferenceEngine for RtenEngine {
    fn predict(&self, batched: &Tensor) -> Result<Prediction> {
        let input = to_model_input(&self.input_shape, batched)?;
        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| DiagnosisError::Inference(format!("{} model: {}", self.name, e)))?;
        let output: rten_tensor::Tensor<f32> = output.try_into().map_err(|e| {
            DiagnosisError::Inference(format!("{} model produced a non-float output: {}", self.name, e))
        })?;

        Prediction::from_probabilities(output.to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for RtenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtenEngine")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("input_shape", &self.input_shape)
            .finish()
    }
}
