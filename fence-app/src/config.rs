//! Application configuration file.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "estimates.db"
//!
//! [pricing]
//! material_markup_pct = 0.20
//! equipment_fee = 400
//! delivery_fee = 150
//! disposal_fee = 150
//!
//! [business]
//! name = "Vasseur Fencing"
//!
//! [logging]
//! level = "info"
//! file = "fence-estimator.log"
//! ```
//!
//! Every section and key is optional; missing values take the defaults shown.

use std::path::{Path, PathBuf};

use fence_core::DbConfig;
use fence_core::PricingConfig;
use fence_core::links::DEFAULT_BUSINESS_NAME;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "fence-estimator.toml";
pub const DEFAULT_DATABASE: &str = "estimates.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub pricing: PricingSection,
    pub business: BusinessSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: DEFAULT_DATABASE.to_string(),
        }
    }
}

/// Pricing applied to estimates started from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingSection {
    pub material_markup_pct: Decimal,
    pub equipment_fee: Decimal,
    pub delivery_fee: Decimal,
    pub disposal_fee: Decimal,
}

impl Default for PricingSection {
    fn default() -> Self {
        let defaults = PricingConfig::default();
        Self {
            material_markup_pct: defaults.material_markup_pct,
            equipment_fee: defaults.equipment_fee,
            delivery_fee: defaults.delivery_fee,
            disposal_fee: defaults.disposal_fee,
        }
    }
}

impl From<PricingSection> for PricingConfig {
    fn from(section: PricingSection) -> Self {
        Self {
            material_markup_pct: section.material_markup_pct,
            equipment_fee: section.equipment_fee,
            delivery_fee: section.delivery_fee,
            disposal_fee: section.disposal_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusinessSection {
    /// Shown in the text-message body sent to customers.
    pub name: String,
}

impl Default for BusinessSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUSINESS_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Log filter directive. `RUST_LOG` wins when set.
    pub level: Option<String>,
    /// Append log records to this file as well as the console.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml_str(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Loads `explicit` if given; otherwise [`DEFAULT_CONFIG_FILE`] from the
    /// working directory if it exists; otherwise the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            debug!(path = %fallback.display(), "using config file from working directory");
            return Self::from_file(fallback);
        }
        Ok(Self::default())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection_string.clone(),
        }
    }

    pub fn pricing(&self) -> PricingConfig {
        self.pricing.into()
    }
}
