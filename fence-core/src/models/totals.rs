use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Priced snapshot stored alongside a quote's inputs.
///
/// Values keep full precision; round only when displaying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Totals {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_lf: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub material_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}
