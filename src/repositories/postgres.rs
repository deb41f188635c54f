//! PostgreSQL-backed product store.
//!
//! Every call runs inside its own scoped transaction: reads are marked
//! `READ ONLY`, inserts and updates run read-write, and deletes go straight
//! to the pool. A transaction that is dropped before `commit` is rolled back
//! by sqlx, so early returns through `?` never leave one open.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::{ProductRepository, RepositoryError};
use crate::models::product::Product;
use crate::pagination::{Page, PageRequest};

const PRODUCT_COLUMNS: &str = "id, name, description, price, img_url";

#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin_read_only(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let mut tx = self.begin_read_only().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Product>, RepositoryError> {
        let mut tx = self.begin_read_only().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;

        // ORDER BY is assembled from the closed set of sortable columns only.
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY {} LIMIT $1 OFFSET $2",
            request.sort().to_sql()
        ))
        .bind(i64::from(request.size()))
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Page::new(products, request, u64::try_from(total).unwrap_or(0)))
    }

    #[instrument(skip(self, product), fields(id = ?product.id))]
    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let saved = match product.id {
            None => sqlx::query_as::<_, Product>(&format!(
                "INSERT INTO products (name, description, price, img_url)
                 VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
            ))
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.img_url)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::classify)?,
            Some(id) => sqlx::query_as::<_, Product>(&format!(
                "UPDATE products SET
                 name = $1,
                 description = $2,
                 price = $3,
                 img_url = $4
                 WHERE id = $5 RETURNING {PRODUCT_COLUMNS}"
            ))
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.img_url)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepositoryError::classify)?
            .ok_or(RepositoryError::EntityNotFound(id))?,
        };

        tx.commit().await?;
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::classify)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::EntityNotFound(id));
        }

        Ok(())
    }
}
