use std::path::Path;

use image::ImageReader;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{DiagnosisError, Result};
use crate::tensor::Tensor;

/// Extensions accepted for uploaded slides
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Spatial size the classifiers were trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub height: u32,
    pub width: u32,
}

impl TargetSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Shape of a batched model input: `[1, height, width, 3]`.
    pub fn batched_shape(&self) -> Vec<usize> {
        vec![1, self.height as usize, self.width as usize, 3]
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self::new(128, 128)
    }
}

/// Decode the image at `path` into a `height x width x 3` tensor in [0, 1].
///
/// No batch dimension is added; the cascade does that before inference.
pub fn load(path: &Path, target: TargetSize) -> Result<Tensor> {
    let invalid = |reason: String| DiagnosisError::InvalidImage {
        path: path.to_path_buf(),
        reason,
    };

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| invalid("missing file extension".to_string()))?;
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(invalid(format!("unsupported extension '{}'", extension)));
    }

    let img = ImageReader::open(path)
        .map_err(|e| invalid(format!("failed to open: {}", e)))?
        .with_guessed_format()
        .map_err(|e| invalid(format!("failed to read: {}", e)))?
        .decode()
        .map_err(|e| invalid(format!("failed to decode: {}", e)))?;

    log::debug!(
        "Loaded {:?}: {}x{}, resizing to {}x{}",
        path,
        img.width(),
        img.height(),
        target.width,
        target.height
    );

    let rgb = img
        .resize_exact(target.width, target.height, FilterType::Nearest)
        .to_rgb8();

    let data: Vec<f32> = rgb
        .pixels()
        .flat_map(|pixel| pixel.0)
        .map(|channel| channel as f32 / 255.0)
        .collect();

    Tensor::from_data(
        vec![target.height as usize, target.width as usize, 3],
        data,
    )
}
