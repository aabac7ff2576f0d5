//! Users collection contract.

use async_trait::async_trait;
use mockall::automock;
use tokio::sync::watch;

use satchel::prelude::*;

use super::BackendError;

/// Live view of one user record; `None` while the record does not exist.
///
/// The channel holds a single slot, so a slow reader only ever sees the newest
/// snapshot.
pub type UserSnapshots = watch::Receiver<Option<UserRecord>>;

#[automock]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Open a snapshot subscription on a user record.
    async fn watch_user(&self, user: &UserId) -> Result<UserSnapshots, BackendError>;

    /// Array-union `item` into `myCart`, leaving every other field untouched.
    async fn merge_cart_item(&self, user: &UserId, item: CartItem) -> Result<(), BackendError>;

    /// Overwrite `myCart` with `items`.
    async fn replace_cart(&self, user: &UserId, items: Vec<CartItem>) -> Result<(), BackendError>;
}
