mod factory;
mod repository;

pub use factory::{SqliteRepositoryFactory, database_url};
pub use repository::SqliteRepository;
