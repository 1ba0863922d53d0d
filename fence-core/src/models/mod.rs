mod estimate_inputs;
mod pricing_config;
mod quote;
mod segment;
mod totals;

use thiserror::Error;
use uuid::Uuid;

pub use estimate_inputs::{EstimateInputs, Material, PostSize, WoodType};
pub use pricing_config::PricingConfig;
pub use quote::{Customer, Quote, QuoteStatus, fallback_title, resolve_title};
pub use segment::{Segment, segment_label};
pub use totals::Totals;

/// Returned when text does not name a known status, material, wood type or
/// post size.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariantError {
    pub kind: &'static str,
    pub value: String,
}

/// Generates an opaque identifier such as `est_3f2a…`.
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}
