use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{EstimateInputs, PricingConfig, Totals, UnknownVariantError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Sold,
    Void,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 3] = [Self::Pending, Self::Sold, Self::Void];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sold => "sold",
            Self::Void => "void",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "sold" => Some(Self::Sold),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&s.trim().to_ascii_lowercase()).ok_or_else(|| UnknownVariantError {
            kind: "status",
            value: s.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// A saved, priced fence-installation proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub status: QuoteStatus,

    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub customer: Customer,

    #[serde(flatten)]
    pub inputs: EstimateInputs,
    #[serde(flatten)]
    pub pricing: PricingConfig,

    /// Computed when the quote was saved; never recomputed on read.
    #[serde(default)]
    pub totals: Totals,
}

/// Title used when the user leaves the title blank.
pub fn fallback_title(
    customer: &Customer,
    total_lf: Decimal,
) -> String {
    let name = customer.name.trim();
    let name = if name.is_empty() { "Estimate" } else { name };
    format!("{} — {} LF", name, round_lf(total_lf))
}

/// Returns the trimmed title, or the fallback when it is blank.
pub fn resolve_title(
    title: &str,
    customer: &Customer,
    total_lf: Decimal,
) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        fallback_title(customer, total_lf)
    } else {
        trimmed.to_string()
    }
}

fn round_lf(total_lf: Decimal) -> Decimal {
    total_lf
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}
