use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductCategory};

/// Read-only view of the product catalog.
pub struct CatalogService<R> {
    repo: R,
}

impl<R: ProductRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn list(&self, category: Option<ProductCategory>) -> Result<Vec<Product>, DomainError> {
        self.repo.list(category)
    }
}
