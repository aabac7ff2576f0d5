//! Backend contracts
//!
//! The hosted document store is consumed through these repository traits.
//! [`InMemoryBackend`] implements all of them for tests and the CLI.

use std::sync::Arc;

use thiserror::Error;

mod coupons;
mod memory;
mod orders;
mod products;
mod users;

pub use coupons::{CouponsRepository, MockCouponsRepository};
pub use memory::{InMemoryBackend, Operation, Seed};
pub use orders::{MockOrdersRepository, OrdersRepository};
pub use products::{MockProductsRepository, ProductsRepository};
pub use users::{MockUsersRepository, UserSnapshots, UsersRepository};

/// Errors reported by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("document not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// One handle per collection.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub products: Arc<dyn ProductsRepository>,
    pub coupons: Arc<dyn CouponsRepository>,
    pub orders: Arc<dyn OrdersRepository>,
}
