#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from histodiag for tests
pub use histodiag::{
    BenignSubtype, BinaryLabel, CascadeClassifier, CaseRecord, CaseRecordStore,
    ClassificationRequest, ClassificationResult, ClassificationType, DiagnosisError, Grade,
    LabelSet, MalignantSubtype, PatientForm, PatientInfo, PrimaryLabel, ReportFormat,
    ReportGenerator, Scored, Sex, Subtype, TargetSize, Tensor,
};
