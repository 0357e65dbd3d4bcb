use std::path::PathBuf;

use strum::{Display, EnumString};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

use crate::error::{DiagnosisError, Result};
use crate::labels::{BinaryLabel, Grade, PrimaryLabel, Subtype};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ClassificationType {
    #[strum(to_string = "Type Classification", serialize = "type")]
    TypeClassification,
    #[strum(to_string = "Grade Classification", serialize = "grade")]
    GradeClassification,
}

/// Raw intake form; any field may still be missing.
#[derive(Debug, Clone, Default)]
pub struct PatientForm {
    pub name: String,
    pub age: String,
    pub sex: Option<Sex>,
}

/// Validated patient details attached to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientInfo {
    name: String,
    age: String,
    sex: Sex,
}

impl PatientInfo {
    /// Validate the form, reporting the first missing field in form order.
    pub fn from_form(form: &PatientForm) -> Result<Self> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(DiagnosisError::MissingField("name"));
        }
        let age = form.age.trim();
        if age.is_empty() {
            return Err(DiagnosisError::MissingField("age"));
        }
        let sex = form.sex.ok_or(DiagnosisError::MissingField("sex"))?;
        Ok(Self {
            name: name.to_string(),
            age: age.to_string(),
            sex,
        })
    }

    pub(crate) fn from_stored(name: String, age: String, sex: Sex) -> Self {
        Self { name, age, sex }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> &str {
        &self.age
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub kind: ClassificationType,
    pub image: Option<PathBuf>,
}

impl ClassificationRequest {
    pub fn new(kind: ClassificationType, image: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            image: Some(image.into()),
        }
    }
}

/// A label together with the probability vector that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<L> {
    pub label: L,
    pub probabilities: Vec<f32>,
}

impl<L> Scored<L> {
    pub fn new(label: L, probabilities: Vec<f32>) -> Self {
        Self {
            label,
            probabilities,
        }
    }

    pub fn map<M>(self, f: impl FnOnce(L) -> M) -> Scored<M> {
        Scored {
            label: f(self.label),
            probabilities: self.probabilities,
        }
    }
}

/// Outcome of the cascade.
///
/// Only the two constructors exist, so a subtype is present exactly for
/// type classifications and always belongs to the binary diagnosis' family.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    primary: Scored<PrimaryLabel>,
    subtype: Option<Scored<Subtype>>,
}

impl ClassificationResult {
    pub fn typed(diagnosis: Scored<BinaryLabel>, subtype: Scored<Subtype>) -> Result<Self> {
        if subtype.label.family() != diagnosis.label {
            return Err(DiagnosisError::Inference(format!(
                "subtype {} does not refine diagnosis {}",
                subtype.label, diagnosis.label
            )));
        }
        Ok(Self {
            primary: diagnosis.map(PrimaryLabel::Binary),
            subtype: Some(subtype),
        })
    }

    pub fn graded(grade: Scored<Grade>) -> Self {
        Self {
            primary: grade.map(PrimaryLabel::Grade),
            subtype: None,
        }
    }

    pub fn primary(&self) -> PrimaryLabel {
        self.primary.label
    }

    pub fn primary_probabilities(&self) -> &[f32] {
        &self.primary.probabilities
    }

    pub fn subtype(&self) -> Option<Subtype> {
        self.subtype.as_ref().map(|scored| scored.label)
    }

    pub fn subtype_probabilities(&self) -> Option<&[f32]> {
        self.subtype.as_ref().map(|scored| scored.probabilities.as_slice())
    }

    pub fn kind(&self) -> ClassificationType {
        match self.primary.label {
            PrimaryLabel::Binary(_) => ClassificationType::TypeClassification,
            PrimaryLabel::Grade(_) => ClassificationType::GradeClassification,
        }
    }
}

/// One persisted row of the case store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    pub patient: PatientInfo,
    pub kind: ClassificationType,
    pub result: PrimaryLabel,
    pub subtype: Option<Subtype>,
    pub timestamp: PrimitiveDateTime,
}

impl CaseRecord {
    pub fn new(
        patient: PatientInfo,
        outcome: &ClassificationResult,
        timestamp: PrimitiveDateTime,
    ) -> Self {
        Self {
            patient,
            kind: outcome.kind(),
            result: outcome.primary(),
            subtype: outcome.subtype(),
            timestamp,
        }
    }

    /// Rebuild a record from stored cells.
    pub(crate) fn from_parts(
        patient: PatientInfo,
        kind: ClassificationType,
        result: PrimaryLabel,
        subtype: Option<Subtype>,
        timestamp: PrimitiveDateTime,
    ) -> Self {
        Self {
            patient,
            kind,
            result,
            subtype,
            timestamp,
        }
    }
}

/// Location of a rendered report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHandle {
    pub id: Uuid,
    pub path: PathBuf,
}

/// Everything a successful workflow run hands back to the caller.
#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub result: ClassificationResult,
    pub record: CaseRecord,
    pub report: ReportHandle,
}

/// Current local time truncated to whole seconds (UTC when the local offset
/// cannot be determined).
pub fn now_timestamp() -> Result<PrimitiveDateTime> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| {
        log::debug!("Local UTC offset unavailable, using UTC");
        OffsetDateTime::now_utc()
    });
    let now = now
        .replace_nanosecond(0)
        .map_err(|e| DiagnosisError::Timestamp(e.to_string()))?;
    Ok(PrimitiveDateTime::new(now.date(), now.time()))
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(timestamp: PrimitiveDateTime) -> Result<String> {
    timestamp
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|e| DiagnosisError::Timestamp(e.to_string()))
}

pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|e| DiagnosisError::Timestamp(format!("'{}': {}", value, e)))
}

/// `YYYYMMDDHHMMSS`, used in report file names.
pub fn compact_timestamp(timestamp: PrimitiveDateTime) -> Result<String> {
    timestamp
        .format(format_description!(
            "[year][month][day][hour][minute][second]"
        ))
        .map_err(|e| DiagnosisError::Timestamp(e.to_string()))
}
