//! Store access for products.
//!
//! Services depend on [`ProductRepository`] only; the concrete backend is
//! picked once at startup.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::product::Product;
use crate::pagination::{Page, PageRequest};

pub use in_memory::InMemoryProductRepository;
pub use postgres::PgProductRepository;

/// SQLSTATE raised by PostgreSQL on foreign key violations.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The identifier given for an update or delete does not resolve to a row.
    #[error("No product with id {0}")]
    EntityNotFound(i64),

    /// The store refused the mutation because another row references the target.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Classifies a raw driver error, singling out foreign key violations.
    pub fn classify(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                return RepositoryError::IntegrityViolation(db_err.message().to_string());
            }
        }
        RepositoryError::Database(err)
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError>;

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Product>, RepositoryError>;

    /// Inserts a transient product or overwrites an existing one.
    ///
    /// Returns the stored row. Fails with [`RepositoryError::EntityNotFound`]
    /// when the product carries an identifier the store does not know.
    async fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError>;

    /// Fails with [`RepositoryError::EntityNotFound`] when nothing was removed
    /// and with [`RepositoryError::IntegrityViolation`] when the row is still
    /// referenced.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}
