pub mod cascade;
pub mod config;
pub mod error;
pub mod image_loader;
pub mod inference;
pub mod labels;
pub mod models;
pub mod records;
pub mod report;
pub mod tensor;
pub mod workflow;

pub use cascade::CascadeClassifier;
pub use config::{ModelPaths, ReportFormat, Settings};
pub use error::{DiagnosisError, Result};
pub use image_loader::TargetSize;
pub use inference::{InferenceEngine, ModelSet, Prediction, RtenEngine};
pub use labels::{BenignSubtype, BinaryLabel, Grade, LabelSet, MalignantSubtype, PrimaryLabel, Subtype};
pub use models::{
    CaseRecord, ClassificationRequest, ClassificationResult, ClassificationType, Diagnosis,
    PatientForm, PatientInfo, ReportHandle, Scored, Sex,
};
pub use records::CaseRecordStore;
pub use report::{ReportDocument, ReportGenerator};
pub use tensor::Tensor;
pub use workflow::WorkflowController;
