//! Fence job pricing.
//!
//! Maps an estimate's inputs and pricing overrides to a [`Totals`] snapshot.
//! The engine is pure: identical inputs always produce identical totals.
//!
//! # Pricing Model
//!
//! | Step          | Rule |
//! |---------------|------|
//! | Linear feet   | Sum of entered segment lengths |
//! | Labor hours   | `36 × LF / 466`, × 1.20 if height ≥ 8 ft, × 1.15 on slope, × 1.08 in rocky soil, then + 1.5 h per walk gate and + 3.0 h per double gate |
//! | Labor cost    | Labor hours × $75 |
//! | Material cost | LF × rate (vinyl 42, chain 28, wood 25 × wood type × post size) × (1 + markup) |
//! | Total         | Material + labor + equipment + delivery + disposal fees |
//!
//! A job with no linear footage has zero labor and a zero total, whatever the
//! fees are. Inputs so large that a step overflows [`Decimal`] price as an
//! empty job and are reported by [`PricingEngine::input_warnings`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fence_core::calculations::PricingEngine;
//! use fence_core::{EstimateInputs, PricingConfig, Segment};
//!
//! let inputs = EstimateInputs {
//!     segments: vec![Segment::new("seg_1", "A-B", Some(dec!(466)))],
//!     ..Default::default()
//! };
//!
//! let totals = PricingEngine::calculate(&inputs, &PricingConfig::default());
//!
//! assert_eq!(totals.labor_hours, dec!(36));
//! assert_eq!(totals.material_cost, dec!(13980));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::models::{EstimateInputs, Material, PostSize, PricingConfig, Totals, WoodType};

/// Crew hours observed on the reference job.
pub const CALIBRATION_HOURS: Decimal = dec!(36);
/// Linear feet of the reference job.
pub const CALIBRATION_LF: Decimal = dec!(466);
/// Crew rate in dollars per labor hour.
pub const LABOR_RATE: Decimal = dec!(75);

const TALL_FENCE_HEIGHT_FT: Decimal = dec!(8);
const TALL_FENCE_FACTOR: Decimal = dec!(1.20);
const SLOPE_FACTOR: Decimal = dec!(1.15);
const ROCKY_FACTOR: Decimal = dec!(1.08);
const WALK_GATE_HOURS: Decimal = dec!(1.5);
const DOUBLE_GATE_HOURS: Decimal = dec!(3.0);

/// A pricing input that is accepted but almost certainly a typo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputWarning {
    NegativeSegmentLength { segment: String, length_ft: Decimal },
    NegativeHeight(Decimal),
    NegativeMarkup(Decimal),
    NegativeFee { fee: &'static str, amount: Decimal },
    /// The job is too large to price; it totals zero.
    OutOfRange,
}

impl std::fmt::Display for InputWarning {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::NegativeSegmentLength { segment, length_ft } => {
                write!(f, "segment {segment} has negative length {length_ft} ft")
            }
            Self::NegativeHeight(h) => write!(f, "fence height is negative ({h} ft)"),
            Self::NegativeMarkup(m) => write!(f, "material markup is negative ({m})"),
            Self::NegativeFee { fee, amount } => write!(f, "{fee} fee is negative ({amount})"),
            Self::OutOfRange => f.write_str("inputs are too large to price; totals set to zero"),
        }
    }
}

/// Stateless calculator for fence job totals.
pub struct PricingEngine;

impl PricingEngine {
    /// Prices a job. Never fails; see [`PricingEngine::input_warnings`] for
    /// inputs that are accepted but suspicious.
    pub fn calculate(
        inputs: &EstimateInputs,
        config: &PricingConfig,
    ) -> Totals {
        Self::checked_totals(inputs, config).unwrap_or_else(|| {
            warn!("pricing overflowed; treating the job as empty");
            Totals::default()
        })
    }

    fn checked_totals(
        inputs: &EstimateInputs,
        config: &PricingConfig,
    ) -> Option<Totals> {
        let total_lf = inputs.total_lf()?;
        let labor_hours = Self::labor_hours(inputs, total_lf)?;
        let labor_cost = labor_hours.checked_mul(LABOR_RATE)?;
        let material_cost = Self::material_cost(inputs, config, total_lf)?;
        let total = Self::total(total_lf, material_cost, labor_cost, config)?;

        Some(Totals {
            total_lf,
            labor_hours,
            labor_cost,
            material_cost,
            total,
        })
    }

    /// Lists inputs that price without error but would produce a
    /// nonsensical quote.
    pub fn input_warnings(
        inputs: &EstimateInputs,
        config: &PricingConfig,
    ) -> Vec<InputWarning> {
        let mut warnings: Vec<InputWarning> = inputs
            .segments
            .iter()
            .filter_map(|seg| match seg.length_ft {
                Some(len) if len < Decimal::ZERO => {
                    Some(InputWarning::NegativeSegmentLength {
                        segment: seg.name.clone(),
                        length_ft: len,
                    })
                }
                _ => None,
            })
            .collect();

        if inputs.height_ft < Decimal::ZERO {
            warnings.push(InputWarning::NegativeHeight(inputs.height_ft));
        }
        if config.material_markup_pct < Decimal::ZERO {
            warnings.push(InputWarning::NegativeMarkup(config.material_markup_pct));
        }
        for (fee, amount) in [
            ("equipment", config.equipment_fee),
            ("delivery", config.delivery_fee),
            ("disposal", config.disposal_fee),
        ] {
            if amount < Decimal::ZERO {
                warnings.push(InputWarning::NegativeFee { fee, amount });
            }
        }
        if Self::checked_totals(inputs, config).is_none() {
            warnings.push(InputWarning::OutOfRange);
        }

        warnings
    }

    /// Compounded site-condition multiplier applied to base labor.
    pub fn labor_multiplier(inputs: &EstimateInputs) -> Decimal {
        let mut multiplier = Decimal::ONE;
        if inputs.height_ft >= TALL_FENCE_HEIGHT_FT {
            multiplier *= TALL_FENCE_FACTOR;
        }
        if inputs.slope {
            multiplier *= SLOPE_FACTOR;
        }
        if inputs.rocky {
            multiplier *= ROCKY_FACTOR;
        }
        multiplier
    }

    /// Material rate per linear foot before markup.
    pub fn material_rate(inputs: &EstimateInputs) -> Decimal {
        match inputs.material {
            Material::Vinyl => Decimal::from(42),
            Material::Chain => Decimal::from(28),
            Material::Wood => {
                Decimal::from(25)
                    * Self::wood_type_factor(inputs.wood_type)
                    * Self::post_size_factor(inputs.post_size)
            }
        }
    }

    fn wood_type_factor(wood_type: WoodType) -> Decimal {
        match wood_type {
            WoodType::Pt => Decimal::ONE,
            WoodType::Cedar => dec!(1.35),
            WoodType::Cedartone => dec!(1.6),
        }
    }

    fn post_size_factor(post_size: PostSize) -> Decimal {
        match post_size {
            PostSize::FourByFour => Decimal::ONE,
            PostSize::SixBySix => dec!(1.2),
        }
    }

    fn labor_hours(
        inputs: &EstimateInputs,
        total_lf: Decimal,
    ) -> Option<Decimal> {
        if total_lf <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }

        // Multiply before dividing so the reference job lands exactly on 36 h.
        let base = CALIBRATION_HOURS.checked_mul(total_lf)? / CALIBRATION_LF;
        let gate_hours = Decimal::from(inputs.gates_walk) * WALK_GATE_HOURS
            + Decimal::from(inputs.gates_double) * DOUBLE_GATE_HOURS;

        base.checked_mul(Self::labor_multiplier(inputs))?
            .checked_add(gate_hours)
    }

    fn material_cost(
        inputs: &EstimateInputs,
        config: &PricingConfig,
        total_lf: Decimal,
    ) -> Option<Decimal> {
        let raw = total_lf.checked_mul(Self::material_rate(inputs))?;
        raw.checked_mul(Decimal::ONE.checked_add(config.material_markup_pct)?)
    }

    fn total(
        total_lf: Decimal,
        material_cost: Decimal,
        labor_cost: Decimal,
        config: &PricingConfig,
    ) -> Option<Decimal> {
        if total_lf <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }
        material_cost
            .checked_add(labor_cost)?
            .checked_add(config.flat_fees()?)
    }
}
