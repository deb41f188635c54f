// src/state.rs
use std::sync::Arc;

use crate::config::PagingConfig;
use crate::repositories::ProductRepository;
use crate::services::product::ProductService;

#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub paging: PagingConfig,
}

impl AppState {
    pub fn new(repository: Arc<dyn ProductRepository>, paging: PagingConfig) -> Self {
        Self {
            products: ProductService::new(repository),
            paging,
        }
    }
}
