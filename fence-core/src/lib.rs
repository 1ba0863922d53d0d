pub mod calculations;
pub mod db;
pub mod draft;
pub mod links;
pub mod models;
pub mod store;

pub use calculations::{InputWarning, PricingEngine};
pub use db::repository::{QuoteRepository, RepositoryError};
pub use db::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use draft::EstimateDraft;
pub use models::*;
pub use store::{QuoteDocument, filter_by_status};
