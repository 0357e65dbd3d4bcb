use crate::cascade::CascadeClassifier;
use crate::error::{DiagnosisError, Result};
use crate::image_loader::{self, TargetSize};
use crate::models::{
    CaseRecord, ClassificationRequest, Diagnosis, PatientForm, PatientInfo, now_timestamp,
};
use crate::records::CaseRecordStore;
use crate::report::ReportGenerator;

/// Runs one diagnosis request end to end.
///
/// Inputs are validated before anything else happens: an incomplete form
/// produces `MissingField` without touching a model or the filesystem. After
/// that the steps run in order (load, classify, store, report) and the first
/// failure aborts the run. A stored record is not rolled back if the report
/// then fails to render.
#[derive(Debug)]
pub struct WorkflowController {
    classifier: CascadeClassifier,
    store: CaseRecordStore,
    reports: ReportGenerator,
    target: TargetSize,
}

impl WorkflowController {
    pub fn new(
        classifier: CascadeClassifier,
        store: CaseRecordStore,
        reports: ReportGenerator,
        target: TargetSize,
    ) -> Self {
        Self {
            classifier,
            store,
            reports,
            target,
        }
    }

    pub fn store(&self) -> &CaseRecordStore {
        &self.store
    }

    pub fn run(&self, form: &PatientForm, request: &ClassificationRequest) -> Result<Diagnosis> {
        let patient = PatientInfo::from_form(form)?;
        let image_path = request
            .image
            .as_deref()
            .ok_or(DiagnosisError::MissingField("image"))?;

        log::info!(
            "Processing {} for {} ({})",
            request.kind,
            patient.name(),
            image_path.display()
        );

        let image = image_loader::load(image_path, self.target)?;
        let result = self.classifier.classify(&image, request.kind)?;

        let record = CaseRecord::new(patient, &result, now_timestamp()?);
        self.store.append(&record)?;

        let report = self.reports.generate(&record)?;

        Ok(Diagnosis {
            result,
            record,
            report,
        })
    }
}
