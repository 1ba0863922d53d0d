//! Pricing calculations for fence estimates.
//!
//! This module provides the pricing engine that turns an estimate's inputs
//! into a totals snapshot, plus shared rounding and money formatting.

pub mod common;
pub mod pricing;

pub use pricing::{InputWarning, PricingEngine};
