use crate::error::{DiagnosisError, Result};

/// Owned row-major `f32` tensor handed from the image loader to the engines.
///
/// Images are laid out channels-last (height, width, channels); batching
/// prepends a leading dimension of 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a tensor, checking that `data` fills `shape` exactly.
    pub fn from_data(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(DiagnosisError::ShapeMismatch {
                expected: shape,
                actual: vec![data.len()],
            });
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![0.0; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Return a copy with a leading batch dimension of 1.
    pub fn batched(&self) -> Self {
        let mut shape = Vec::with_capacity(self.shape.len() + 1);
        shape.push(1);
        shape.extend_from_slice(&self.shape);
        Self {
            shape,
            data: self.data.clone(),
        }
    }

    /// Fail with `ShapeMismatch` unless the shape equals `expected`.
    pub fn expect_shape(&self, expected: &[usize]) -> Result<()> {
        if self.shape != expected {
            return Err(DiagnosisError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: self.shape.clone(),
            });
        }
        Ok(())
    }
}
