//! In-memory document store.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use satchel::{coupons::normalize_code, prelude::*};

use super::{
    BackendError, CouponsRepository, OrdersRepository, ProductsRepository, Repositories,
    UserSnapshots, UsersRepository,
};

/// Backend operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CartWrite,
    ProductRead,
    CouponRead,
    CouponWrite,
    OrderWrite,
}

/// Initial contents of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub products: Vec<Product>,
    pub coupons: Vec<Coupon>,
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Default)]
struct Collections {
    users: FxHashMap<UserId, watch::Sender<Option<UserRecord>>>,
    products: FxHashMap<ProductId, Product>,
    coupons: FxHashMap<CouponId, Coupon>,
    orders: Vec<(OrderId, Order)>,
    failing: FxHashSet<Operation>,
}

impl Collections {
    fn check(&self, operation: Operation) -> Result<(), BackendError> {
        if self.failing.contains(&operation) {
            return Err(BackendError::Unavailable(format!("{operation:?} failed")));
        }

        Ok(())
    }

    fn user_channel(&mut self, user: &UserId) -> &watch::Sender<Option<UserRecord>> {
        self.users
            .entry(user.clone())
            .or_insert_with(|| watch::Sender::new(None))
    }
}

/// Document store kept in process memory.
///
/// Every user record sits behind a `watch` channel, so subscribers see each
/// write the way a hosted store pushes snapshots. Cloning shares the store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<Collections>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `seed`.
    #[must_use]
    pub fn from_seed(seed: Seed) -> Self {
        let backend = Self::new();

        for product in seed.products {
            backend.put_product(product);
        }

        for coupon in seed.coupons {
            backend.put_coupon(coupon);
        }

        for user in seed.users {
            backend.put_user(user);
        }

        backend
    }

    /// Repository handles backed by this store.
    #[must_use]
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            products: Arc::new(self.clone()),
            coupons: Arc::new(self.clone()),
            orders: Arc::new(self.clone()),
        }
    }

    pub fn put_product(&self, product: Product) {
        self.inner.lock().products.insert(product.id.clone(), product);
    }

    pub fn remove_product(&self, product: &ProductId) -> Option<Product> {
        self.inner.lock().products.remove(product)
    }

    /// Insert or replace a coupon. The code is stored normalised.
    pub fn put_coupon(&self, mut coupon: Coupon) {
        coupon.code = normalize_code(&coupon.code);

        self.inner.lock().coupons.insert(coupon.id.clone(), coupon);
    }

    pub fn coupon(&self, coupon: &CouponId) -> Option<Coupon> {
        self.inner.lock().coupons.get(coupon).cloned()
    }

    /// Write a whole user record, as another device or subsystem would.
    pub fn put_user(&self, user: UserRecord) {
        let mut collections = self.inner.lock();

        collections.user_channel(&user.id.clone()).send_replace(Some(user));
    }

    /// Modify a user record in place, creating it if needed.
    pub fn update_user(&self, user: &UserId, update: impl FnOnce(&mut UserRecord)) {
        let mut collections = self.inner.lock();

        collections.user_channel(user).send_modify(|record| {
            update(record.get_or_insert_with(|| UserRecord::new(user.clone())));
        });
    }

    pub fn user(&self, user: &UserId) -> Option<UserRecord> {
        self.inner
            .lock()
            .users
            .get(user)
            .and_then(|channel| channel.borrow().clone())
    }

    /// Orders in creation order.
    pub fn orders(&self) -> Vec<(OrderId, Order)> {
        self.inner.lock().orders.clone()
    }

    /// Make `operation` fail until [`InMemoryBackend::restore`] is called.
    pub fn fail(&self, operation: Operation) {
        self.inner.lock().failing.insert(operation);
    }

    pub fn restore(&self, operation: Operation) {
        self.inner.lock().failing.remove(&operation);
    }
}

#[async_trait]
impl UsersRepository for InMemoryBackend {
    async fn watch_user(&self, user: &UserId) -> Result<UserSnapshots, BackendError> {
        Ok(self.inner.lock().user_channel(user).subscribe())
    }

    async fn merge_cart_item(&self, user: &UserId, item: CartItem) -> Result<(), BackendError> {
        let mut collections = self.inner.lock();

        collections.check(Operation::CartWrite)?;

        let changed = collections.user_channel(user).send_if_modified(|record| {
            record
                .get_or_insert_with(|| UserRecord::new(user.clone()))
                .my_cart
                .merge(item)
        });

        debug!(%user, changed, "merged cart item");

        Ok(())
    }

    async fn replace_cart(&self, user: &UserId, items: Vec<CartItem>) -> Result<(), BackendError> {
        let mut collections = self.inner.lock();

        collections.check(Operation::CartWrite)?;

        collections.user_channel(user).send_modify(|record| {
            record
                .get_or_insert_with(|| UserRecord::new(user.clone()))
                .my_cart = Cart::from(items);
        });

        Ok(())
    }
}

#[async_trait]
impl ProductsRepository for InMemoryBackend {
    async fn get_product(&self, product: &ProductId) -> Result<Option<Product>, BackendError> {
        let collections = self.inner.lock();

        collections.check(Operation::ProductRead)?;

        Ok(collections.products.get(product).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let collections = self.inner.lock();

        collections.check(Operation::ProductRead)?;

        Ok(collections.products.values().cloned().collect())
    }
}

#[async_trait]
impl CouponsRepository for InMemoryBackend {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, BackendError> {
        let collections = self.inner.lock();

        collections.check(Operation::CouponRead)?;

        let code = normalize_code(code);

        Ok(collections
            .coupons
            .values()
            .find(|coupon| coupon.code == code)
            .cloned())
    }

    async fn increment_usage(&self, coupon: &CouponId) -> Result<(), BackendError> {
        let mut collections = self.inner.lock();

        collections.check(Operation::CouponWrite)?;

        let coupon = collections
            .coupons
            .get_mut(coupon)
            .ok_or(BackendError::NotFound)?;

        coupon.usage_count = coupon.usage_count.saturating_add(1);

        Ok(())
    }
}

#[async_trait]
impl OrdersRepository for InMemoryBackend {
    async fn create_order(&self, order: &Order) -> Result<OrderId, BackendError> {
        let mut collections = self.inner.lock();

        collections.check(Operation::OrderWrite)?;

        let id = OrderId::new(Uuid::now_v7().to_string());

        collections.orders.push((id.clone(), order.clone()));

        Ok(id)
    }
}
