//! In-memory product store.
//!
//! Suitable for tests and for running the service without a database
//! (`STORAGE_MODE=in_memory`). Identifiers are assigned from a counter
//! starting at 1, mirroring a `BIGSERIAL` column. Rows referenced by another
//! record are tracked explicitly so deletes can be refused the way a foreign
//! key would refuse them.
//!
//! Text columns sort by byte order (`"Zebra"` before `"apple"`). PostgreSQL
//! sorts them by the database collation instead, so mixed-case names may
//! page differently between the two stores.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ProductRepository, RepositoryError};
use crate::models::product::Product;
use crate::pagination::{Direction, Order, Page, PageRequest, SortProperty};

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<i64, Product>,
    last_id: i64,
    /// Product id -> number of records referencing it.
    references: HashMap<i64, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that another record (an order line, say) points at `id`.
    /// While at least one reference is held the product cannot be deleted.
    pub async fn hold_reference(&self, id: i64) {
        let mut store = self.store.write().await;
        *store.references.entry(id).or_insert(0) += 1;
    }

    pub async fn release_reference(&self, id: i64) {
        let mut store = self.store.write().await;
        if let Some(count) = store.references.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                store.references.remove(&id);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.products.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn compare_by(property: SortProperty, a: &Product, b: &Product) -> Ordering {
    match property {
        SortProperty::Id => a.id.cmp(&b.id),
        SortProperty::Name => a.name.cmp(&b.name),
        SortProperty::Description => a.description.cmp(&b.description),
        SortProperty::Price => a.price.cmp(&b.price),
        SortProperty::ImgUrl => a.img_url.cmp(&b.img_url),
    }
}

fn compare(orders: &[Order], a: &Product, b: &Product) -> Ordering {
    orders
        .iter()
        .map(|order| {
            let ordering = compare_by(order.property, a, b);
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Product>, RepositoryError> {
        let store = self.store.read().await;
        let orders = request.sort().with_id_tiebreak();

        let mut all: Vec<&Product> = store.products.values().collect();
        all.sort_by(|a, b| compare(&orders, a, b));

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = all
            .into_iter()
            .skip(offset)
            .take(request.size() as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, request, store.products.len() as u64))
    }

    async fn save(&self, mut product: Product) -> Result<Product, RepositoryError> {
        let mut store = self.store.write().await;

        let id = match product.id {
            Some(id) if !store.products.contains_key(&id) => {
                return Err(RepositoryError::EntityNotFound(id));
            }
            Some(id) => id,
            None => {
                store.last_id += 1;
                store.last_id
            }
        };

        product.id = Some(id);
        store.products.insert(id, product.clone());
        Ok(product)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.store.read().await.products.contains_key(&id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;

        if !store.products.contains_key(&id) {
            return Err(RepositoryError::EntityNotFound(id));
        }
        if store.references.contains_key(&id) {
            return Err(RepositoryError::IntegrityViolation(format!(
                "product {id} is still referenced"
            )));
        }

        store.products.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Sort;
    use rust_decimal::Decimal;

    fn product(name: &str, cents: i64) -> Product {
        Product {
            id: None,
            name: name.to_string(),
            description: format!("{name} description"),
            price: Decimal::new(cents, 2),
            img_url: format!("http://img/{name}.png"),
        }
    }

    async fn seeded(names: &[(&str, i64)]) -> InMemoryProductRepository {
        let repository = InMemoryProductRepository::new();
        for (name, cents) in names {
            repository.save(product(name, *cents)).await.unwrap();
        }
        repository
    }

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let repository = InMemoryProductRepository::new();
        let first = repository.save(product("a", 100)).await.unwrap();
        let second = repository.save(product("b", 100)).await.unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repository = seeded(&[("a", 100)]).await;
        repository.delete_by_id(1).await.unwrap();
        let next = repository.save(product("b", 100)).await.unwrap();
        assert_eq!(next.id, Some(2));
    }

    #[tokio::test]
    async fn save_with_unknown_id_fails() {
        let repository = InMemoryProductRepository::new();
        let mut ghost = product("ghost", 100);
        ghost.id = Some(99);
        let err = repository.save(ghost).await.unwrap_err();
        assert!(matches!(err, RepositoryError::EntityNotFound(99)));
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn save_with_known_id_overwrites() {
        let repository = seeded(&[("a", 100)]).await;
        let mut changed = product("renamed", 250);
        changed.id = Some(1);
        repository.save(changed.clone()).await.unwrap();
        assert_eq!(repository.find_by_id(1).await.unwrap(), Some(changed));
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn page_never_exceeds_size() {
        let repository = seeded(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]).await;
        let page = repository.find_page(&PageRequest::of(0, 2).unwrap()).await.unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages(), 3);

        let tail = repository.find_page(&PageRequest::of(2, 2).unwrap()).await.unwrap();
        assert_eq!(tail.content.len(), 1);

        let beyond = repository.find_page(&PageRequest::of(9, 2).unwrap()).await.unwrap();
        assert!(beyond.content.is_empty());
        assert_eq!(beyond.total_elements, 5);
    }

    #[tokio::test]
    async fn pages_concatenate_to_every_row_once_in_sort_order() {
        // Duplicate prices force the id tie-break to decide.
        let repository =
            seeded(&[("e", 300), ("a", 100), ("d", 300), ("b", 200), ("c", 100), ("f", 200)]).await;
        let sort = Sort::by(vec![Order::desc(SortProperty::Price)]);

        let mut seen = Vec::new();
        for index in 0..3 {
            let request = PageRequest::new(index, 2, sort.clone()).unwrap();
            let page = repository.find_page(&request).await.unwrap();
            seen.extend(page.content.into_iter().map(|p| p.id.unwrap()));
        }

        assert_eq!(seen, vec![1, 3, 4, 6, 2, 5]);
    }

    #[tokio::test]
    async fn sorts_by_name_ascending() {
        let repository = seeded(&[("pear", 1), ("apple", 1), ("melon", 1)]).await;
        let request = PageRequest::new(0, 10, "name".parse().unwrap()).unwrap();
        let names: Vec<_> = repository
            .find_page(&request)
            .await
            .unwrap()
            .content
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["apple", "melon", "pear"]);
    }

    #[tokio::test]
    async fn text_sorts_by_byte_order() {
        let repository = seeded(&[("apple", 1), ("Zebra", 1), ("mango", 1)]).await;
        let request = PageRequest::new(0, 10, "name".parse().unwrap()).unwrap();
        let names: Vec<_> = repository
            .find_page(&request)
            .await
            .unwrap()
            .content
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Zebra", "apple", "mango"]);
    }

    #[tokio::test]
    async fn referenced_product_cannot_be_deleted() {
        let repository = seeded(&[("a", 100)]).await;
        repository.hold_reference(1).await;

        let err = repository.delete_by_id(1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::IntegrityViolation(_)));
        assert!(repository.exists_by_id(1).await.unwrap());

        repository.release_reference(1).await;
        repository.delete_by_id(1).await.unwrap();
        assert!(!repository.exists_by_id(1).await.unwrap());
    }

    #[tokio::test]
    async fn delete_unknown_id_fails() {
        let repository = InMemoryProductRepository::new();
        let err = repository.delete_by_id(3).await.unwrap_err();
        assert!(matches!(err, RepositoryError::EntityNotFound(3)));
    }
}
