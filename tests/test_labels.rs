//! Tests for label-set lookup, display names and parsing.

mod common;

use common::*;

#[test]
fn test_index_lookup_matches_model_output_order() -> anyhow::Result<()> {
    assert_eq!(BinaryLabel::from_index(0)?, BinaryLabel::Benign);
    assert_eq!(BinaryLabel::from_index(1)?, BinaryLabel::Malignant);
    assert_eq!(BenignSubtype::from_index(2)?, BenignSubtype::PhyllodesTumor);
    assert_eq!(MalignantSubtype::from_index(2)?, MalignantSubtype::MucinousCarcinoma);
    assert_eq!(Grade::from_index(2)?, Grade::Grade3);
    Ok(())
}

#[test]
fn test_out_of_range_index_is_rejected() {
    let err = BinaryLabel::from_index(2).unwrap_err();
    assert!(
        matches!(
            err,
            DiagnosisError::UnknownClassIndex {
                label_set: "Binary",
                index: 2
            }
        ),
        "unexpected error: {:?}",
        err
    );

    assert!(matches!(
        Grade::from_index(3),
        Err(DiagnosisError::UnknownClassIndex { index: 3, .. })
    ));
    assert!(MalignantSubtype::from_index(usize::MAX).is_err());
}

#[test]
fn test_class_counts() {
    assert_eq!(BinaryLabel::CLASS_COUNT, 2);
    assert_eq!(BenignSubtype::CLASS_COUNT, 4);
    assert_eq!(MalignantSubtype::CLASS_COUNT, 4);
    assert_eq!(Grade::CLASS_COUNT, 3);
}

#[test]
fn test_display_names() {
    assert_eq!(BinaryLabel::Malignant.to_string(), "Malignant");
    assert_eq!(BenignSubtype::TubularAdenoma.to_string(), "Tubular Adenoma");
    assert_eq!(MalignantSubtype::DuctalCarcinoma.to_string(), "Ductal Carcinoma");
    assert_eq!(Grade::Grade1.to_string(), "Grade 1");
    assert_eq!(
        Subtype::Malignant(MalignantSubtype::PapillaryCarcinoma).to_string(),
        "Papillary Carcinoma"
    );
    assert_eq!(PrimaryLabel::Grade(Grade::Grade2).to_string(), "Grade 2");
    assert_eq!(
        ClassificationType::TypeClassification.to_string(),
        "Type Classification"
    );
}

#[test]
fn test_parse_display_names() -> anyhow::Result<()> {
    assert_eq!(
        "Benign".parse::<PrimaryLabel>()?,
        PrimaryLabel::Binary(BinaryLabel::Benign)
    );
    assert_eq!(
        "Grade 3".parse::<PrimaryLabel>()?,
        PrimaryLabel::Grade(Grade::Grade3)
    );
    assert_eq!(
        "Phyllodes Tumor".parse::<Subtype>()?,
        Subtype::Benign(BenignSubtype::PhyllodesTumor)
    );
    assert_eq!(
        "Lobular Carcinoma".parse::<Subtype>()?,
        Subtype::Malignant(MalignantSubtype::LobularCarcinoma)
    );
    assert!("Grade 4".parse::<PrimaryLabel>().is_err());
    assert!("Carcinoma".parse::<Subtype>().is_err());
    Ok(())
}

#[test]
fn test_form_values_parse_case_insensitively() -> anyhow::Result<()> {
    assert_eq!("female".parse::<Sex>()?, Sex::Female);
    assert_eq!("OTHER".parse::<Sex>()?, Sex::Other);
    assert_eq!(
        "grade".parse::<ClassificationType>()?,
        ClassificationType::GradeClassification
    );
    assert_eq!(
        "Type Classification".parse::<ClassificationType>()?,
        ClassificationType::TypeClassification
    );
    Ok(())
}

#[test]
fn test_subtype_family() {
    assert_eq!(
        Subtype::Benign(BenignSubtype::Adenosis).family(),
        BinaryLabel::Benign
    );
    assert_eq!(
        Subtype::Malignant(MalignantSubtype::DuctalCarcinoma).family(),
        BinaryLabel::Malignant
    );
}

#[test]
fn test_result_rejects_subtype_from_other_family() {
    let result = ClassificationResult::typed(
        Scored::new(BinaryLabel::Benign, vec![0.9, 0.1]),
        Scored::new(
            Subtype::Malignant(MalignantSubtype::DuctalCarcinoma),
            vec![0.7, 0.1, 0.1, 0.1],
        ),
    );
    assert!(result.is_err());
}
