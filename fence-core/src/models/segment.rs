use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One straight run of fence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `None` until a length has been entered. Stored as `null`.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub length_ft: Option<Decimal>,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        length_ft: Option<Decimal>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            length_ft,
        }
    }

    /// Length this segment contributes to the job total.
    pub fn effective_length(&self) -> Decimal {
        self.length_ft.unwrap_or(Decimal::ZERO)
    }
}

/// Label for the segment at `index`, e.g. `A-B` for 0 and `B-C` for 1.
///
/// Past `Y-Z` the labels continue through the ASCII range after `Z`, which
/// matches how the estimator page has always named them.
pub fn segment_label(index: usize) -> String {
    let from = char::from_u32(65 + index as u32).unwrap_or('?');
    let to = char::from_u32(66 + index as u32).unwrap_or('?');
    format!("{from}-{to}")
}
