use std::path::PathBuf;

/// Every failure a diagnosis run can surface to its caller.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("Invalid image {path:?}: {reason}")]
    InvalidImage { path: PathBuf, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Model '{model}' unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("Tensor shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Class index {index} is out of range for label set {label_set}")]
    UnknownClassIndex {
        label_set: &'static str,
        index: usize,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Case store error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Case store is corrupt: {0}")]
    CorruptStore(String),

    #[error("Report rendering failed: {0}")]
    Render(String),

    #[error("Timestamp error: {0}")]
    Timestamp(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiagnosisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiagnosisError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiagnosisError>;
