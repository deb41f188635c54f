// src/services/product.rs
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::dtos::product::ProductDto;
use crate::error::AppError;
use crate::models::product::Product;
use crate::pagination::{Page, PageRequest};
use crate::repositories::{ProductRepository, RepositoryError};

const NOT_FOUND_BY_ID: &str = "Resource not found by the given id";
const NOT_FOUND: &str = "Resource not found";
const INTEGRITY_VIOLATION: &str = "Referential integrity violation";

/// Product use cases. Owns the conversion between the wire shape and the
/// entity, and turns the two meaningful store failures into domain errors.
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<ProductDto, AppError> {
        let product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND_BY_ID))?;

        Ok(ProductDto::from(product))
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self, request: &PageRequest) -> Result<Page<ProductDto>, AppError> {
        let page = self.repository.find_page(request).await?;
        Ok(page.map(ProductDto::from))
    }

    #[instrument(skip(self, dto))]
    pub async fn insert(&self, dto: ProductDto) -> Result<ProductDto, AppError> {
        let mut product = Product::from(dto);
        product.id = None;

        let saved = self.repository.save(product).await?;
        debug!(id = ?saved.id, "Product created");
        Ok(ProductDto::from(saved))
    }

    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: i64, dto: ProductDto) -> Result<ProductDto, AppError> {
        let mut product = Product::reference(id);
        dto.copy_onto(&mut product);

        match self.repository.save(product).await {
            Ok(saved) => Ok(ProductDto::from(saved)),
            Err(RepositoryError::EntityNotFound(_)) => Err(AppError::not_found(NOT_FOUND)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.exists_by_id(id).await? {
            return Err(AppError::not_found(NOT_FOUND));
        }

        match self.repository.delete_by_id(id).await {
            Ok(()) => Ok(()),
            // Removed concurrently between the existence check and the delete.
            Err(RepositoryError::EntityNotFound(_)) => Err(AppError::not_found(NOT_FOUND)),
            Err(RepositoryError::IntegrityViolation(detail)) => {
                warn!(%detail, "Delete blocked by a referencing record");
                Err(AppError::integrity(INTEGRITY_VIOLATION))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{Order, Sort, SortProperty};
    use crate::repositories::InMemoryProductRepository;
    use rust_decimal::Decimal;

    fn dto(name: &str, cents: i64) -> ProductDto {
        ProductDto {
            id: None,
            name: name.to_string(),
            description: "A perfectly ordinary item".to_string(),
            price: Decimal::new(cents, 2),
            img_url: format!("http://x/{name}.png"),
        }
    }

    fn service() -> (ProductService, InMemoryProductRepository) {
        let repository = InMemoryProductRepository::new();
        (ProductService::new(Arc::new(repository.clone())), repository)
    }

    #[tokio::test]
    async fn insert_ignores_incoming_id() {
        let (service, _) = service();
        let mut input = dto("Chair", 9990);
        input.id = Some(500);

        let created = service.insert(input.clone()).await.unwrap();

        assert_eq!(created.id, Some(1));
        assert_eq!(ProductDto { id: None, ..created }, ProductDto { id: None, ..input });
    }

    #[tokio::test]
    async fn find_by_id_reflects_last_write() {
        let (service, _) = service();
        let created = service.insert(dto("Chair", 9990)).await.unwrap();
        let id = created.id.unwrap();

        assert_eq!(service.find_by_id(id).await.unwrap(), created);

        let updated = service.update(id, dto("Chair v2", 10990)).await.unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.name, "Chair v2");
        assert_eq!(service.find_by_id(id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_everywhere() {
        let (service, _) = service();

        assert!(matches!(service.find_by_id(9).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.update(9, dto("Ghost", 100)).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(9).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn deleted_id_is_not_found() {
        let (service, _) = service();
        let id = service.insert(dto("Lamp", 1500)).await.unwrap().id.unwrap();

        service.delete(id).await.unwrap();

        assert!(matches!(service.find_by_id(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_of_missing_id_does_not_create_it() {
        let (service, repository) = service();
        let _ = service.update(3, dto("Ghost", 100)).await;
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn referenced_product_delete_is_an_integrity_error() {
        let (service, repository) = service();
        let created = service.insert(dto("Desk", 25000)).await.unwrap();
        let id = created.id.unwrap();
        repository.hold_reference(id).await;

        match service.delete(id).await {
            Err(AppError::DatabaseIntegrity(msg)) => assert_eq!(msg, INTEGRITY_VIOLATION),
            other => panic!("expected integrity error, got {other:?}"),
        }
        assert_eq!(service.find_by_id(id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn find_all_converts_and_keeps_metadata() {
        let (service, _) = service();
        for (name, cents) in [("b", 300), ("a", 100), ("c", 200)] {
            service.insert(dto(name, cents)).await.unwrap();
        }

        let request = PageRequest::new(0, 2, Sort::by(vec![Order::asc(SortProperty::Price)])).unwrap();
        let page = service.find_all(&request).await.unwrap();

        let names: Vec<_> = page.content.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(page.page, 0);
        assert_eq!(page.size, 2);
        assert_eq!(page.total_elements, 3);
    }
}
