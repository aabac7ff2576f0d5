//! Orders collection contract.

use async_trait::async_trait;
use mockall::automock;

use satchel::prelude::*;

use super::BackendError;

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Create a new order document and return its id.
    async fn create_order(&self, order: &Order) -> Result<OrderId, BackendError>;
}
