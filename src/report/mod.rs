mod render;

use std::fs;
use std::path::{Path, PathBuf};

use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::config::ReportFormat;
use crate::error::{DiagnosisError, Result};
use crate::models::{CaseRecord, ReportHandle, compact_timestamp, format_timestamp, now_timestamp};

pub use render::{DocumentRenderer, PdfRenderer, TextRenderer};

pub const REPORT_TITLE: &str = "Breast Cancer Diagnosis Report";

/// Format-independent report layout: a title and the labelled lines below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub lines: Vec<String>,
}

impl ReportDocument {
    pub fn from_record(record: &CaseRecord, generated_at: PrimitiveDateTime) -> Result<Self> {
        let mut lines = vec![
            format!("Patient Name: {}", record.patient.name()),
            format!("Age: {}", record.patient.age()),
            format!("Sex: {}", record.patient.sex()),
            format!("Classification Type: {}", record.kind),
            format!("Prediction: {}", record.result),
        ];
        if let Some(subtype) = record.subtype {
            lines.push(format!("Subtype: {}", subtype));
        }
        lines.push(format!("Date: {}", format_timestamp(generated_at)?));

        Ok(Self {
            title: REPORT_TITLE.to_string(),
            lines,
        })
    }
}

pub struct ReportGenerator {
    output_dir: PathBuf,
    renderer: Box<dyn DocumentRenderer>,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        let renderer: Box<dyn DocumentRenderer> = match format {
            ReportFormat::Pdf => Box::new(PdfRenderer),
            ReportFormat::Text => Box::new(TextRenderer),
        };
        Self::with_renderer(output_dir, renderer)
    }

    pub fn with_renderer(output_dir: impl Into<PathBuf>, renderer: Box<dyn DocumentRenderer>) -> Self {
        Self {
            output_dir: output_dir.into(),
            renderer,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render the report for `record` and return where it was written.
    pub fn generate(&self, record: &CaseRecord) -> Result<ReportHandle> {
        let generated_at = now_timestamp()?;
        let document = ReportDocument::from_record(record, generated_at)?;

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| DiagnosisError::io(&self.output_dir, e))?;

        let id = Uuid::new_v4();
        let file_name = report_file_name(
            record.patient.name(),
            &compact_timestamp(generated_at)?,
            &id,
            self.renderer.extension(),
        );
        let path = self.output_dir.join(file_name);
        self.renderer.render(&document, &path)?;

        log::info!("Report written to {}", path.display());
        Ok(ReportHandle { id, path })
    }
}

impl std::fmt::Debug for ReportGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportGenerator")
            .field("output_dir", &self.output_dir)
            .field("format", &self.renderer.extension())
            .finish()
    }
}

/// `<name>_<YYYYMMDDHHMMSS>_<first 8 hex digits of id>.<ext>`
pub fn report_file_name(patient_name: &str, stamp: &str, id: &Uuid, extension: &str) -> String {
    let short_id: String = id.simple().to_string().chars().take(8).collect();
    format!(
        "{}_{}_{}.{}",
        sanitize_file_stem(patient_name),
        stamp,
        short_id,
        extension
    )
}

/// Keep ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "patient".to_string()
    } else {
        stem
    }
}
