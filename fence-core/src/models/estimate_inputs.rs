use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Segment, UnknownVariantError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Wood,
    Vinyl,
    Chain,
}

impl Material {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Vinyl => "vinyl",
            Self::Chain => "chain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wood" => Some(Self::Wood),
            "vinyl" => Some(Self::Vinyl),
            "chain" => Some(Self::Chain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WoodType {
    /// Pressure treated.
    #[default]
    Pt,
    Cedar,
    Cedartone,
}

impl WoodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pt => "pt",
            Self::Cedar => "cedar",
            Self::Cedartone => "cedartone",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pt" => Some(Self::Pt),
            "cedar" => Some(Self::Cedar),
            "cedartone" => Some(Self::Cedartone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostSize {
    #[default]
    #[serde(rename = "4x4")]
    FourByFour,
    #[serde(rename = "6x6")]
    SixBySix,
}

impl PostSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FourByFour => "4x4",
            Self::SixBySix => "6x6",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "4x4" => Some(Self::FourByFour),
            "6x6" => Some(Self::SixBySix),
            _ => None,
        }
    }
}

macro_rules! impl_text_enum {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariantError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(&s.trim().to_ascii_lowercase()).ok_or_else(|| UnknownVariantError {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

impl_text_enum!(Material, "material");
impl_text_enum!(WoodType, "wood type");
impl_text_enum!(PostSize, "post size");

/// The job description a price is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimateInputs {
    pub segments: Vec<Segment>,
    pub corners: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub height_ft: Decimal,
    pub material: Material,
    /// Only consulted when `material` is wood.
    pub wood_type: WoodType,
    /// Only consulted when `material` is wood.
    pub post_size: PostSize,
    pub slope: bool,
    pub rocky: bool,
    pub gates_walk: u32,
    pub gates_double: u32,
}

impl Default for EstimateInputs {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            corners: 0,
            height_ft: Decimal::from(6),
            material: Material::default(),
            wood_type: WoodType::default(),
            post_size: PostSize::default(),
            slope: false,
            rocky: false,
            gates_walk: 0,
            gates_double: 0,
        }
    }
}

impl EstimateInputs {
    /// Sum of all entered segment lengths, or `None` if it overflows.
    pub fn total_lf(&self) -> Option<Decimal> {
        self.segments
            .iter()
            .map(Segment::effective_length)
            .try_fold(Decimal::ZERO, Decimal::checked_add)
    }
}
