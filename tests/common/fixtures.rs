use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use histodiag::{
    BinaryLabel, CascadeClassifier, CaseRecord, CaseRecordStore, ClassificationResult,
    DiagnosisError, InferenceEngine, ModelSet, PatientForm, PatientInfo, Prediction, ReportFormat,
    ReportGenerator, Scored, Sex, Subtype, TargetSize, Tensor, WorkflowController,
};
use image::{ImageBuffer, Rgb};
use tempfile::NamedTempFile;

/// Engine that always answers with the same class and counts its invocations.
pub struct ScriptedEngine {
    name: String,
    class_index: usize,
    classes: usize,
    expected_shape: Option<Vec<usize>>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(name: &str, class_index: usize, classes: usize) -> Self {
        Self {
            name: name.to_string(),
            class_index,
            classes,
            expected_shape: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Reject inputs whose shape differs from `shape`, like a real model would.
    pub fn with_expected_shape(mut self, shape: Vec<usize>) -> Self {
        self.expected_shape = Some(shape);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceEngine for ScriptedEngine {
    fn predict(&self, batched: &Tensor) -> Result<Prediction, DiagnosisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(shape) = &self.expected_shape {
            batched.expect_shape(shape)?;
        }
        let others = if self.classes > 1 {
            0.3 / (self.classes - 1) as f32
        } else {
            0.0
        };
        let probabilities = (0..self.classes)
            .map(|i| if i == self.class_index { 0.7 } else { others })
            .collect();
        Prediction::from_probabilities(probabilities)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The four scripted engines plus the `ModelSet` sharing them.
pub struct TestModels {
    pub binary: Arc<ScriptedEngine>,
    pub benign: Arc<ScriptedEngine>,
    pub malignant: Arc<ScriptedEngine>,
    pub grade: Arc<ScriptedEngine>,
}

impl TestModels {
    pub fn new(binary: usize, benign: usize, malignant: usize, grade: usize) -> Self {
        Self {
            binary: Arc::new(ScriptedEngine::new("binary", binary, 2)),
            benign: Arc::new(ScriptedEngine::new("benign", benign, 4)),
            malignant: Arc::new(ScriptedEngine::new("malignant", malignant, 4)),
            grade: Arc::new(ScriptedEngine::new("grade", grade, 3)),
        }
    }

    pub fn model_set(&self) -> ModelSet {
        ModelSet {
            binary: self.binary.clone(),
            benign: self.benign.clone(),
            malignant: self.malignant.clone(),
            grade: self.grade.clone(),
        }
    }

    pub fn total_calls(&self) -> usize {
        self.binary.calls() + self.benign.calls() + self.malignant.calls() + self.grade.calls()
    }
}

/// Creates a 100x100 red test image and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

pub fn jane_form() -> PatientForm {
    PatientForm {
        name: "Jane".to_string(),
        age: "45".to_string(),
        sex: Some(Sex::Female),
    }
}

pub fn jane() -> PatientInfo {
    PatientInfo::from_form(&jane_form()).expect("Jane's form is complete")
}

pub fn records_path(dir: &Path) -> PathBuf {
    dir.join("records").join("case_data.csv")
}

pub fn reports_dir(dir: &Path) -> PathBuf {
    dir.join("reports")
}

/// Controller writing plain-text reports and the case store below `dir`.
pub fn make_controller(models: &TestModels, dir: &Path) -> WorkflowController {
    make_controller_with_format(models, dir, ReportFormat::Text)
}

pub fn make_controller_with_format(
    models: &TestModels,
    dir: &Path,
    format: ReportFormat,
) -> WorkflowController {
    WorkflowController::new(
        CascadeClassifier::new(models.model_set()),
        CaseRecordStore::new(records_path(dir)),
        ReportGenerator::new(reports_dir(dir), format),
        TargetSize::default(),
    )
}

/// Text shown on every page of the PDF at `path`.
pub fn pdf_text(path: &Path) -> String {
    let document = lopdf::Document::load(path).expect("Failed to parse PDF report");
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    document
        .extract_text(&pages)
        .expect("Failed to extract PDF text")
}

/// Malignant / mucinous carcinoma classification.
pub fn mucinous_result() -> ClassificationResult {
    ClassificationResult::typed(
        Scored::new(BinaryLabel::Malignant, vec![0.2, 0.8]),
        Scored::new(
            Subtype::Malignant(histodiag::MalignantSubtype::MucinousCarcinoma),
            vec![0.1, 0.1, 0.7, 0.1],
        ),
    )
    .expect("subtype matches diagnosis")
}

/// Record for the malignant / mucinous carcinoma case.
pub fn mucinous_record(timestamp: time::PrimitiveDateTime) -> CaseRecord {
    CaseRecord::new(jane(), &mucinous_result(), timestamp)
}
