//! The persisted quote list.
//!
//! Backends store the whole list as one JSON document under a single key.
//! This module owns that document's schema and the list semantics every
//! backend shares:
//!
//! * new quotes go to the front, updates replace the record in place,
//! * reads never fail: corrupt or unreadable data is an empty list.
//!
//! # Schema versions
//!
//! | Version | Layout |
//! |---------|--------|
//! | 1       | Bare JSON array of quotes (the browser estimator's format) |
//! | 2       | `{ "version": 2, "quotes": [...] }` |
//!
//! Version 1 documents are migrated on read and written back as version 2 on
//! the next write.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Quote, QuoteStatus};

/// Storage key of the quote document.
pub const QUOTES_KEY: &str = "vasseur_estimates_v1";
/// Storage key of the active quote id.
pub const ACTIVE_QUOTE_KEY: &str = "vasseur_active_estimate_id_v1";

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDocument {
    version: u32,
    quotes: Vec<Quote>,
}

impl QuoteDocument {
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            quotes: Vec::new(),
        }
    }

    /// Parses a stored document, migrating older layouts.
    ///
    /// Never fails: anything unreadable becomes an empty document.
    pub fn from_json(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new();
        }

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "stored quotes are not valid JSON; treating as empty");
                return Self::new();
            }
        };

        match value {
            Value::Array(items) => {
                debug!(count = items.len(), "migrating version 1 quote list");
                Self::from_items(items)
            }
            Value::Object(mut map) => {
                let version = map.get("version").and_then(Value::as_u64).unwrap_or(0);
                if version == 0 || version > u64::from(CURRENT_VERSION) {
                    warn!(version, "unsupported quote document version; treating as empty");
                    return Self::new();
                }
                match map.remove("quotes") {
                    Some(Value::Array(items)) => Self::from_items(items),
                    _ => {
                        warn!("quote document has no quote list; treating as empty");
                        Self::new()
                    }
                }
            }
            _ => {
                warn!("stored quotes have an unexpected shape; treating as empty");
                Self::new()
            }
        }
    }

    /// Keeps every record that parses; drops the rest.
    fn from_items(items: Vec<Value>) -> Self {
        let quotes = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<Quote>(item) {
                Ok(quote) => Some(quote),
                Err(error) => {
                    warn!(index, %error, "dropping unreadable stored quote");
                    None
                }
            })
            .collect();

        Self {
            version: CURRENT_VERSION,
            quotes,
        }
    }

    /// Serializes the document at the current schema version.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Self {
            version: CURRENT_VERSION,
            quotes: self.quotes.clone(),
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn into_quotes(self) -> Vec<Quote> {
        self.quotes
    }

    pub fn get(
        &self,
        id: &str,
    ) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }

    pub fn get_mut(
        &mut self,
        id: &str,
    ) -> Option<&mut Quote> {
        self.quotes.iter_mut().find(|q| q.id == id)
    }

    /// Replaces the quote with the same id in place, or inserts it at the
    /// front. Returns `true` when an existing record was replaced.
    pub fn upsert(
        &mut self,
        quote: Quote,
    ) -> bool {
        match self.quotes.iter().position(|q| q.id == quote.id) {
            Some(index) => {
                self.quotes[index] = quote;
                true
            }
            None => {
                self.quotes.insert(0, quote);
                false
            }
        }
    }

    /// Removes the quote with `id`. Returns `true` if one was removed.
    pub fn remove(
        &mut self,
        id: &str,
    ) -> bool {
        let before = self.quotes.len();
        self.quotes.retain(|q| q.id != id);
        self.quotes.len() != before
    }
}

/// Quotes matching `status`, or all of them for `None`. Keeps list order.
pub fn filter_by_status(
    quotes: &[Quote],
    status: Option<QuoteStatus>,
) -> Vec<&Quote> {
    quotes
        .iter()
        .filter(|q| status.is_none_or(|s| q.status == s))
        .collect()
}
