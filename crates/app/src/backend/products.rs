//! Products collection contract.

use async_trait::async_trait;
use mockall::automock;

use satchel::prelude::*;

use super::BackendError;

#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Fetch one product; `None` if it has been unpublished.
    async fn get_product(&self, product: &ProductId) -> Result<Option<Product>, BackendError>;

    /// Every published product.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;
}
