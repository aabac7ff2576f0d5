//! App Context

use std::sync::Arc;

use crate::{
    backend::{InMemoryBackend, ProductsRepository, Repositories},
    domain::{
        cart::CartStore,
        checkout::CheckoutProcessor,
        coupons::{BackendCouponsService, CouponsService},
    },
    settings::StoreSettings,
};

/// Services for one storefront session.
#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsRepository>,
    pub coupons: Arc<dyn CouponsService>,
    pub cart: CartStore,
    pub checkout: Arc<CheckoutProcessor>,
    pub settings: StoreSettings,
}

impl AppContext {
    /// Wire the storefront services over `repositories`.
    #[must_use]
    pub fn new(repositories: Repositories, settings: StoreSettings) -> Self {
        let coupons: Arc<dyn CouponsService> =
            Arc::new(BackendCouponsService::new(repositories.coupons));

        Self {
            cart: CartStore::new(repositories.users),
            checkout: Arc::new(CheckoutProcessor::new(
                Arc::clone(&repositories.products),
                repositories.orders,
                Arc::clone(&coupons),
                settings.clone(),
            )),
            products: repositories.products,
            coupons,
            settings,
        }
    }

    /// Services backed by an in-process store.
    #[must_use]
    pub fn in_memory(backend: &InMemoryBackend, settings: StoreSettings) -> Self {
        Self::new(backend.repositories(), settings)
    }
}
