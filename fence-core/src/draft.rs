//! The estimate being edited.
//!
//! An [`EstimateDraft`] holds unsaved edits for one quote. Saving packages
//! it into a [`Quote`] with a fresh totals snapshot and hands it to a
//! [`QuoteRepository`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calculations::PricingEngine;
use crate::db::{QuoteRepository, RepositoryError};
use crate::models::{
    Customer, EstimateInputs, PricingConfig, Quote, QuoteStatus, Segment, Totals, generate_id,
    resolve_title, segment_label,
};

/// Prefix of quote ids.
pub const QUOTE_ID_PREFIX: &str = "est";
/// Prefix of segment ids.
pub const SEGMENT_ID_PREFIX: &str = "seg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateDraft {
    pub id: String,
    pub status: QuoteStatus,
    /// Set once the quote has been saved.
    pub created_at: Option<DateTime<Utc>>,
    pub title: String,
    pub notes: String,
    pub customer: Customer,
    pub inputs: EstimateInputs,
    pub pricing: PricingConfig,
}

impl Default for EstimateDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimateDraft {
    pub fn new() -> Self {
        Self::with_pricing(PricingConfig::default())
    }

    /// A blank draft priced with `pricing` instead of the built-in defaults.
    pub fn with_pricing(pricing: PricingConfig) -> Self {
        Self {
            id: generate_id(QUOTE_ID_PREFIX),
            status: QuoteStatus::Pending,
            created_at: None,
            title: String::new(),
            notes: String::new(),
            customer: Customer::default(),
            inputs: EstimateInputs::default(),
            pricing,
        }
    }

    /// Loads every field of a saved quote for editing.
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            id: quote.id.clone(),
            status: quote.status,
            created_at: Some(quote.created_at),
            title: quote.title.clone(),
            notes: quote.notes.clone(),
            customer: quote.customer.clone(),
            inputs: quote.inputs.clone(),
            pricing: quote.pricing,
        }
    }

    /// Appends an empty segment named after its position. Returns its id.
    pub fn add_segment(&mut self) -> String {
        let id = generate_id(SEGMENT_ID_PREFIX);
        let name = segment_label(self.inputs.segments.len());
        self.inputs
            .segments
            .push(Segment::new(id.clone(), name, None));
        id
    }

    /// Renames a segment and sets its length. Returns `false` for an
    /// unknown id.
    pub fn update_segment(
        &mut self,
        id: &str,
        name: impl Into<String>,
        length_ft: Option<Decimal>,
    ) -> bool {
        match self.inputs.segments.iter_mut().find(|s| s.id == id) {
            Some(segment) => {
                segment.name = name.into();
                segment.length_ft = length_ft;
                true
            }
            None => false,
        }
    }

    pub fn remove_segment(
        &mut self,
        id: &str,
    ) -> bool {
        let before = self.inputs.segments.len();
        self.inputs.segments.retain(|s| s.id != id);
        self.inputs.segments.len() != before
    }

    /// Starts over on a new quote id.
    ///
    /// Title, notes and job inputs go back to defaults. Pricing is kept.
    /// The customer is kept unless `reset_customer` is set, so a second
    /// estimate for the same client starts pre-filled.
    pub fn reset(
        &mut self,
        reset_customer: bool,
    ) {
        self.id = generate_id(QUOTE_ID_PREFIX);
        self.status = QuoteStatus::Pending;
        self.created_at = None;
        self.title.clear();
        self.notes.clear();
        self.inputs = EstimateInputs::default();
        if reset_customer {
            self.customer = Customer::default();
        }
        debug!(id = %self.id, reset_customer, "estimate draft reset");
    }

    pub fn totals(&self) -> Totals {
        PricingEngine::calculate(&self.inputs, &self.pricing)
    }

    /// Packages the draft as a quote stamped at `now`.
    pub fn to_quote(
        &self,
        now: DateTime<Utc>,
    ) -> Quote {
        let totals = self.totals();
        Quote {
            id: self.id.clone(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
            status: self.status,
            title: resolve_title(&self.title, &self.customer, totals.total_lf),
            notes: self.notes.clone(),
            customer: self.customer.clone(),
            inputs: self.inputs.clone(),
            pricing: self.pricing,
            totals,
        }
    }

    /// Saves the draft and makes it the active quote.
    pub async fn save(
        &mut self,
        repo: &dyn QuoteRepository,
    ) -> Result<Quote, RepositoryError> {
        let quote = self.to_quote(Utc::now());
        repo.upsert(&quote).await?;
        repo.set_active(&quote.id).await?;

        self.created_at = Some(quote.created_at);
        info!(id = %quote.id, title = %quote.title, total = %quote.totals.total, "quote saved");
        Ok(quote)
    }

    /// Saves a copy under a new id, leaving the original quote untouched.
    /// The copy starts out pending.
    pub async fn save_as_new(
        &mut self,
        repo: &dyn QuoteRepository,
    ) -> Result<Quote, RepositoryError> {
        let previous = std::mem::replace(&mut self.id, generate_id(QUOTE_ID_PREFIX));
        self.status = QuoteStatus::Pending;
        self.created_at = None;
        debug!(from = %previous, to = %self.id, "saving estimate as new quote");
        self.save(repo).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Material;
    use crate::store::QuoteDocument;

    /// Keeps the quote document in memory, the way a key-value backend
    /// keeps it under one key.
    #[derive(Default)]
    struct MemoryRepository {
        doc: Mutex<QuoteDocument>,
        active: Mutex<String>,
    }

    #[async_trait]
    impl QuoteRepository for MemoryRepository {
        async fn list_all(&self) -> Result<Vec<Quote>, RepositoryError> {
            Ok(self.doc.lock().unwrap().quotes().to_vec())
        }
        async fn upsert(
            &self,
            quote: &Quote,
        ) -> Result<(), RepositoryError> {
            self.doc.lock().unwrap().upsert(quote.clone());
            Ok(())
        }
        async fn get_by_id(
            &self,
            id: &str,
        ) -> Result<Option<Quote>, RepositoryError> {
            Ok(self.doc.lock().unwrap().get(id).cloned())
        }
        async fn remove(
            &self,
            id: &str,
        ) -> Result<(), RepositoryError> {
            self.doc.lock().unwrap().remove(id);
            let mut active = self.active.lock().unwrap();
            if *active == id {
                active.clear();
            }
            Ok(())
        }
        async fn set_active(
            &self,
            id: &str,
        ) -> Result<(), RepositoryError> {
            *self.active.lock().unwrap() = id.to_string();
            Ok(())
        }
        async fn get_active(&self) -> Result<String, RepositoryError> {
            Ok(self.active.lock().unwrap().clone())
        }
        async fn set_status(
            &self,
            id: &str,
            status: QuoteStatus,
        ) -> Result<Option<Quote>, RepositoryError> {
            let mut doc = self.doc.lock().unwrap();
            Ok(doc.get_mut(id).map(|q| {
                q.status = status;
                q.updated_at = Utc::now();
                q.clone()
            }))
        }
    }

    fn draft_with_length(lf: Decimal) -> EstimateDraft {
        let mut draft = EstimateDraft::new();
        let seg = draft.add_segment();
        draft.update_segment(&seg, "A-B", Some(lf));
        draft
    }

    // =========================================================================
    // editing
    // =========================================================================

    #[test]
    fn new_draft_is_blank_and_pending() {
        let draft = EstimateDraft::new();

        assert!(draft.id.starts_with("est_"));
        assert_eq!(draft.status, QuoteStatus::Pending);
        assert_eq!(draft.created_at, None);
        assert!(draft.inputs.segments.is_empty());
        assert_eq!(draft.pricing, PricingConfig::default());
    }

    #[test]
    fn segments_are_named_by_position() {
        let mut draft = EstimateDraft::new();
        draft.add_segment();
        draft.add_segment();
        draft.add_segment();

        let names: Vec<&str> = draft.inputs.segments.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["A-B", "B-C", "C-D"]);
        assert!(draft.inputs.segments.iter().all(|s| s.length_ft.is_none()));
    }

    #[test]
    fn segment_names_follow_current_count_after_removal() {
        let mut draft = EstimateDraft::new();
        let first = draft.add_segment();
        draft.add_segment();
        draft.remove_segment(&first);

        draft.add_segment();

        let names: Vec<&str> = draft.inputs.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B-C", "B-C"]);
    }

    #[test]
    fn update_and_remove_unknown_segment_report_false() {
        let mut draft = EstimateDraft::new();

        assert!(!draft.update_segment("seg_missing", "X", Some(dec!(1))));
        assert!(!draft.remove_segment("seg_missing"));
    }

    #[test]
    fn reset_keeps_customer_and_pricing_by_default() {
        let mut draft = draft_with_length(dec!(120));
        draft.customer.name = "Smith".to_string();
        draft.title = "Back yard".to_string();
        draft.notes = "dog".to_string();
        draft.pricing.delivery_fee = dec!(90);
        draft.status = QuoteStatus::Sold;
        let old_id = draft.id.clone();

        draft.reset(false);

        assert_ne!(draft.id, old_id);
        assert_eq!(draft.customer.name, "Smith");
        assert_eq!(draft.pricing.delivery_fee, dec!(90));
        assert_eq!(draft.title, "");
        assert_eq!(draft.notes, "");
        assert_eq!(draft.status, QuoteStatus::Pending);
        assert_eq!(draft.inputs, EstimateInputs::default());
    }

    #[test]
    fn reset_can_clear_customer() {
        let mut draft = EstimateDraft::new();
        draft.customer.phone = "231-555-0100".to_string();

        draft.reset(true);

        assert_eq!(draft.customer, Customer::default());
    }

    // =========================================================================
    // packaging
    // =========================================================================

    #[test]
    fn to_quote_snapshots_totals_and_fallback_title() {
        let mut draft = draft_with_length(dec!(466));
        draft.customer.name = "Smith".to_string();
        let now = Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap();

        let quote = draft.to_quote(now);

        assert_eq!(quote.title, "Smith — 466 LF");
        assert_eq!(quote.totals.labor_hours, dec!(36));
        assert_eq!(quote.totals.material_cost, dec!(13980));
        assert_eq!(quote.created_at, now);
        assert_eq!(quote.updated_at, now);
    }

    #[test]
    fn to_quote_keeps_original_creation_time() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let mut draft = EstimateDraft::new();
        draft.created_at = Some(created);

        let quote = draft.to_quote(now);

        assert_eq!(quote.created_at, created);
        assert_eq!(quote.updated_at, now);
    }

    #[test]
    fn from_quote_round_trips_editable_fields() {
        let mut draft = draft_with_length(dec!(80));
        draft.inputs.material = Material::Chain;
        draft.notes = "north gate".to_string();
        let quote = draft.to_quote(Utc::now());

        let hydrated = EstimateDraft::from_quote(&quote);

        assert_eq!(hydrated.id, quote.id);
        assert_eq!(hydrated.inputs, draft.inputs);
        assert_eq!(hydrated.notes, "north gate");
        assert_eq!(hydrated.created_at, Some(quote.created_at));
    }

    // =========================================================================
    // saving
    // =========================================================================

    #[tokio::test]
    async fn save_stores_quote_and_makes_it_active() {
        let repo = MemoryRepository::default();
        let mut draft = draft_with_length(dec!(100));

        let saved = draft.save(&repo).await.unwrap();

        assert_eq!(repo.get_active().await.unwrap(), draft.id);
        assert_eq!(repo.get_by_id(&draft.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn saving_twice_updates_in_place_and_keeps_creation_time() {
        let repo = MemoryRepository::default();
        let mut draft = draft_with_length(dec!(100));
        let first = draft.save(&repo).await.unwrap();

        draft.notes = "revised".to_string();
        let second = draft.save(&repo).await.unwrap();

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.notes, "revised");
    }

    #[tokio::test]
    async fn save_keeps_status_of_hydrated_quote() {
        let repo = MemoryRepository::default();
        let mut draft = draft_with_length(dec!(100));
        draft.save(&repo).await.unwrap();
        let sold = repo
            .set_status(&draft.id, QuoteStatus::Sold)
            .await
            .unwrap()
            .unwrap();

        let mut reopened = EstimateDraft::from_quote(&sold);
        let resaved = reopened.save(&repo).await.unwrap();

        assert_eq!(resaved.status, QuoteStatus::Sold);
    }

    #[tokio::test]
    async fn save_as_new_forks_a_pending_copy() {
        let repo = MemoryRepository::default();
        let mut draft = draft_with_length(dec!(100));
        draft.status = QuoteStatus::Sold;
        let original = draft.save(&repo).await.unwrap();

        let copy = draft.save_as_new(&repo).await.unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.status, QuoteStatus::Pending);
        assert_eq!(repo.get_active().await.unwrap(), copy.id);

        let ids: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![copy.id, original.id]);
    }
}
