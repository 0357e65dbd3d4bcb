use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DiagnosisError, Result};
use crate::image_loader::TargetSize;

/// Runtime settings, read from an optional YAML file.
///
/// Every field has a default so an empty (or absent) file yields a working
/// layout relative to the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub models: ModelPaths,
    pub input: TargetSize,
    pub records_path: PathBuf,
    pub reports_dir: PathBuf,
    pub report_format: ReportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub binary: PathBuf,
    pub benign: PathBuf,
    pub malignant: PathBuf,
    pub grade: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Text,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models: ModelPaths::default(),
            input: TargetSize::default(),
            records_path: PathBuf::from("records/case_data.csv"),
            reports_dir: PathBuf::from("reports"),
            report_format: ReportFormat::default(),
        }
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("model/binary_model.rten"),
            benign: PathBuf::from("model/benign_model.rten"),
            malignant: PathBuf::from("model/malignant_model.rten"),
            grade: PathBuf::from("model/grade_model.rten"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let config_str =
            std::fs::read_to_string(path).map_err(|e| DiagnosisError::io(path, e))?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self> {
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(config_str)
            .map_err(|e| DiagnosisError::Config(e.to_string()))?;
        if settings.input.height == 0 || settings.input.width == 0 {
            return Err(DiagnosisError::Config(
                "input height and width must be non-zero".to_string(),
            ));
        }
        Ok(settings)
    }
}
