use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Per-quote pricing overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingConfig {
    /// Markup on raw material cost as a fraction (`0.20` is +20%).
    #[serde(with = "rust_decimal::serde::float")]
    pub material_markup_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub equipment_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub disposal_fee: Decimal,
}

impl PricingConfig {
    pub const DEFAULT_MATERIAL_MARKUP_PCT: Decimal = dec!(0.20);
    pub const DEFAULT_EQUIPMENT_FEE: Decimal = dec!(400);
    pub const DEFAULT_DELIVERY_FEE: Decimal = dec!(150);
    pub const DEFAULT_DISPOSAL_FEE: Decimal = dec!(150);

    /// Sum of the flat per-job fees, or `None` if it overflows.
    pub fn flat_fees(&self) -> Option<Decimal> {
        self.equipment_fee
            .checked_add(self.delivery_fee)?
            .checked_add(self.disposal_fee)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            material_markup_pct: Self::DEFAULT_MATERIAL_MARKUP_PCT,
            equipment_fee: Self::DEFAULT_EQUIPMENT_FEE,
            delivery_fee: Self::DEFAULT_DELIVERY_FEE,
            disposal_fee: Self::DEFAULT_DISPOSAL_FEE,
        }
    }
}
