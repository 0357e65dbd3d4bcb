use crate::error::Result;
use crate::inference::{InferenceEngine, ModelSet};
use crate::labels::{BenignSubtype, BinaryLabel, Grade, LabelSet, MalignantSubtype, Subtype};
use crate::models::{ClassificationResult, ClassificationType, Scored};
use crate::tensor::Tensor;

/// Progress of one cascade run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    Start,
    BinaryDone(BinaryLabel),
    BenignSubtypeDone,
    MalignantSubtypeDone,
    GradeDone(Grade),
}

/// Routes an image through the classifiers selected by the request type.
///
/// Type classification runs the binary model and then exactly one subtype
/// model chosen by the binary outcome. Grade classification runs only the
/// grade model. There is no abstention branch: every accepted tensor yields a
/// label, however flat the probabilities are.
#[derive(Debug, Clone)]
pub struct CascadeClassifier {
    models: ModelSet,
}

impl CascadeClassifier {
    pub fn new(models: ModelSet) -> Self {
        Self { models }
    }

    /// Classify an unbatched image tensor.
    pub fn classify(&self, image: &Tensor, kind: ClassificationType) -> Result<ClassificationResult> {
        let batched = image.batched();
        let mut trace = vec![CascadeStage::Start];

        let result = match kind {
            ClassificationType::TypeClassification => {
                let diagnosis: Scored<BinaryLabel> = run_stage(&*self.models.binary, &batched)?;
                trace.push(CascadeStage::BinaryDone(diagnosis.label));

                let subtype = match diagnosis.label {
                    BinaryLabel::Benign => {
                        let scored: Scored<BenignSubtype> = run_stage(&*self.models.benign, &batched)?;
                        trace.push(CascadeStage::BenignSubtypeDone);
                        scored.map(Subtype::Benign)
                    }
                    BinaryLabel::Malignant => {
                        let scored: Scored<MalignantSubtype> =
                            run_stage(&*self.models.malignant, &batched)?;
                        trace.push(CascadeStage::MalignantSubtypeDone);
                        scored.map(Subtype::Malignant)
                    }
                };
                ClassificationResult::typed(diagnosis, subtype)?
            }
            ClassificationType::GradeClassification => {
                let grade: Scored<Grade> = run_stage(&*self.models.grade, &batched)?;
                trace.push(CascadeStage::GradeDone(grade.label));
                ClassificationResult::graded(grade)
            }
        };

        log::debug!("Cascade stages: {:?}", trace);
        match result.subtype() {
            Some(subtype) => log::info!("{}: {} ({})", kind, result.primary(), subtype),
            None => log::info!("{}: {}", kind, result.primary()),
        }
        Ok(result)
    }
}

fn run_stage<L: LabelSet>(engine: &dyn InferenceEngine, batched: &Tensor) -> Result<Scored<L>> {
    log::debug!("Running {} classifier", engine.name());
    let prediction = engine.predict(batched)?;
    let label = L::from_index(prediction.class_index)?;
    log::debug!(
        "  {} -> class {} ({}), probabilities {:?}",
        engine.name(),
        prediction.class_index,
        label,
        prediction.probabilities
    );
    Ok(Scored::new(label, prediction.probabilities))
}
