//! Label sets produced by the four classifiers.
//!
//! Every classifier emits a class index; the index is only meaningful against
//! the label set of the model that produced it. Lookups are bounds-checked so
//! that a model with an unexpected output width fails loudly instead of being
//! mapped onto a wrong diagnosis.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumCount, EnumString, FromRepr};

use crate::error::{DiagnosisError, Result};

/// A closed set of class labels indexed the way the model's output is.
pub trait LabelSet: Sized + Copy + fmt::Display + FromStr {
    /// Name used in error messages.
    const SET_NAME: &'static str;

    /// Number of classes the model for this set must emit.
    const CLASS_COUNT: usize;

    fn from_repr_index(index: usize) -> Option<Self>;

    /// Map a class index onto a label, failing on out-of-range indices.
    fn from_index(index: usize) -> Result<Self> {
        Self::from_repr_index(index).ok_or(DiagnosisError::UnknownClassIndex {
            label_set: Self::SET_NAME,
            index,
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumCount, FromRepr,
)]
#[repr(usize)]
pub enum BinaryLabel {
    Benign = 0,
    Malignant = 1,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumCount, FromRepr,
)]
#[repr(usize)]
pub enum BenignSubtype {
    Adenosis = 0,
    Fibroadenoma = 1,
    #[strum(serialize = "Phyllodes Tumor")]
    PhyllodesTumor = 2,
    #[strum(serialize = "Tubular Adenoma")]
    TubularAdenoma = 3,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumCount, FromRepr,
)]
#[repr(usize)]
pub enum MalignantSubtype {
    #[strum(serialize = "Ductal Carcinoma")]
    DuctalCarcinoma = 0,
    #[strum(serialize = "Lobular Carcinoma")]
    LobularCarcinoma = 1,
    #[strum(serialize = "Mucinous Carcinoma")]
    MucinousCarcinoma = 2,
    #[strum(serialize = "Papillary Carcinoma")]
    PapillaryCarcinoma = 3,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumCount, FromRepr,
)]
#[repr(usize)]
pub enum Grade {
    #[strum(serialize = "Grade 1")]
    Grade1 = 0,
    #[strum(serialize = "Grade 2")]
    Grade2 = 1,
    #[strum(serialize = "Grade 3")]
    Grade3 = 2,
}

impl LabelSet for BinaryLabel {
    const SET_NAME: &'static str = "Binary";
    const CLASS_COUNT: usize = <Self as EnumCount>::COUNT;

    fn from_repr_index(index: usize) -> Option<Self> {
        Self::from_repr(index)
    }
}

impl LabelSet for BenignSubtype {
    const SET_NAME: &'static str = "BenignSubtype";
    const CLASS_COUNT: usize = <Self as EnumCount>::COUNT;

    fn from_repr_index(index: usize) -> Option<Self> {
        Self::from_repr(index)
    }
}

impl LabelSet for MalignantSubtype {
    const SET_NAME: &'static str = "MalignantSubtype";
    const CLASS_COUNT: usize = <Self as EnumCount>::COUNT;

    fn from_repr_index(index: usize) -> Option<Self> {
        Self::from_repr(index)
    }
}

impl LabelSet for Grade {
    const SET_NAME: &'static str = "Grade";
    const CLASS_COUNT: usize = <Self as EnumCount>::COUNT;

    fn from_repr_index(index: usize) -> Option<Self> {
        Self::from_repr(index)
    }
}

/// Headline label of a result: the binary diagnosis or the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryLabel {
    Binary(BinaryLabel),
    Grade(Grade),
}

impl fmt::Display for PrimaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryLabel::Binary(label) => fmt::Display::fmt(label, f),
            PrimaryLabel::Grade(grade) => fmt::Display::fmt(grade, f),
        }
    }
}

impl FromStr for PrimaryLabel {
    type Err = DiagnosisError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(label) = s.parse::<BinaryLabel>() {
            return Ok(PrimaryLabel::Binary(label));
        }
        s.parse::<Grade>()
            .map(PrimaryLabel::Grade)
            .map_err(|_| DiagnosisError::CorruptStore(format!("unknown result label '{}'", s)))
    }
}

/// Refinement of a binary diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    Benign(BenignSubtype),
    Malignant(MalignantSubtype),
}

impl Subtype {
    /// The binary diagnosis this subtype refines.
    pub fn family(&self) -> BinaryLabel {
        match self {
            Subtype::Benign(_) => BinaryLabel::Benign,
            Subtype::Malignant(_) => BinaryLabel::Malignant,
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subtype::Benign(label) => fmt::Display::fmt(label, f),
            Subtype::Malignant(label) => fmt::Display::fmt(label, f),
        }
    }
}

impl FromStr for Subtype {
    type Err = DiagnosisError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(label) = s.parse::<BenignSubtype>() {
            return Ok(Subtype::Benign(label));
        }
        s.parse::<MalignantSubtype>()
            .map(Subtype::Malignant)
            .map_err(|_| DiagnosisError::CorruptStore(format!("unknown subtype label '{}'", s)))
    }
}
