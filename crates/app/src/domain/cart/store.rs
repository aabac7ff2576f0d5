//! Cart store.
//!
//! One store per browsing session. It mirrors the signed-in user's `myCart`
//! through a snapshot subscription and writes changes straight to the
//! backend; the local cart is only ever replaced by snapshots, so a failed
//! write needs no rollback.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info};

use satchel::prelude::*;

use crate::{
    backend::{UserSnapshots, UsersRepository},
    domain::{
        cart::errors::CartError,
        coupons::{CouponError, CouponQuote, CouponsService},
    },
    events::{EventBus, StorefrontEvent},
};

/// Result of adding a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Written to the backend; the snapshot will follow.
    Added,

    /// Already in the cart; nothing was written.
    AlreadyInCart,
}

#[derive(Debug, Default)]
struct Session {
    user: Option<AuthUser>,
    cart: Cart,
    coupon: Option<AppliedCoupon>,
    return_to: Option<String>,
    generation: u64,
    subscription: Option<JoinHandle<()>>,
}

impl Session {
    /// Stop the active subscription. Snapshots still in flight for it are
    /// discarded by the generation check.
    fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }

        self.generation = self.generation.wrapping_add(1);
    }

    fn signed_in_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|user| user.id.clone())
    }
}

struct Inner {
    users: Arc<dyn UsersRepository>,
    session: Mutex<Session>,
    events: EventBus,
}

impl Inner {
    /// Replace the cart with a snapshot. Returns `false` once the
    /// subscription that produced it has been superseded.
    fn apply_snapshot(&self, generation: u64, record: Option<UserRecord>) -> bool {
        let mut session = self.session.lock();

        if session.generation != generation {
            return false;
        }

        session.cart = record.map(|record| record.my_cart).unwrap_or_default();

        let count = session.cart.len();

        debug!(count, "cart snapshot received");

        self.events.publish(StorefrontEvent::CartChanged { count });

        true
    }
}

async fn follow_snapshots(inner: Weak<Inner>, generation: u64, mut snapshots: UserSnapshots) {
    while snapshots.changed().await.is_ok() {
        let record = snapshots.borrow_and_update().clone();

        let Some(inner) = inner.upgrade() else {
            break;
        };

        if !inner.apply_snapshot(generation, record) {
            break;
        }
    }
}

/// The signed-in user's cart, kept in sync with the backend.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl Debug for CartStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartStore")
            .field("session", &*self.inner.session.lock())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    #[must_use]
    pub fn new(users: Arc<dyn UsersRepository>) -> Self {
        Self {
            inner: Arc::new(Inner {
                users,
                session: Mutex::new(Session::default()),
                events: EventBus::new(),
            }),
        }
    }

    /// Observe cart changes and drawer requests.
    pub fn events(&self) -> broadcast::Receiver<StorefrontEvent> {
        self.inner.events.subscribe()
    }

    /// Sign `user` in and follow their cart, replacing any earlier
    /// subscription.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the subscription cannot be
    /// opened; the previous session is left untouched in that case.
    pub async fn subscribe(&self, user: AuthUser) -> Result<(), CartError> {
        let mut snapshots = self.inner.users.watch_user(&user.id).await.map_err(|e| {
            error!(user = %user.id, "failed to subscribe to cart: {e}");

            CartError::Persistence(e)
        })?;

        let initial = snapshots.borrow_and_update().clone();

        let mut session = self.inner.session.lock();

        session.detach();

        let generation = session.generation;

        info!(user = %user.id, generation, "cart subscription started");

        session.user = Some(user);
        session.coupon = None;
        session.cart = initial.map(|record| record.my_cart).unwrap_or_default();
        session.subscription = Some(tokio::spawn(follow_snapshots(
            Arc::downgrade(&self.inner),
            generation,
            snapshots,
        )));

        self.inner.events.publish(StorefrontEvent::CartChanged {
            count: session.cart.len(),
        });

        Ok(())
    }

    /// Sign out: stop following the cart and reset all session state.
    pub fn dispose(&self) {
        let mut session = self.inner.session.lock();

        session.detach();

        if let Some(user) = session.user.take() {
            info!(user = %user.id, "cart subscription stopped");
        }

        session.cart = Cart::default();
        session.coupon = None;
        session.return_to = None;

        self.inner
            .events
            .publish(StorefrontEvent::CartChanged { count: 0 });
    }

    /// Add `product` to the cart.
    ///
    /// Signed-out callers get [`CartError::Unauthenticated`] and `return_to`
    /// is remembered for after sign-in. A product already in the cart is not
    /// written again. Either way the cart drawer is asked to open.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unauthenticated`] when signed out and
    /// [`CartError::Persistence`] when the write fails.
    pub async fn add(&self, product: &Product, return_to: &str) -> Result<AddOutcome, CartError> {
        let user = {
            let mut session = self.inner.session.lock();

            let Some(user) = session.signed_in_id() else {
                session.return_to = Some(return_to.to_string());

                return Err(CartError::Unauthenticated {
                    return_to: return_to.to_string(),
                });
            };

            if session.cart.contains(&product.id) {
                drop(session);

                self.request_open();

                return Ok(AddOutcome::AlreadyInCart);
            }

            user
        };

        self.inner
            .users
            .merge_cart_item(&user, CartItem::from(product))
            .await
            .map_err(|e| {
                error!(%user, product = %product.id, "failed to add cart item: {e}");

                CartError::Persistence(e)
            })?;

        self.request_open();

        Ok(AddOutcome::Added)
    }

    /// Remove `product` by writing back the rest of the cart.
    ///
    /// Signed out, or with `product` not in the cart, this does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] when the write fails.
    pub async fn remove(&self, product: &ProductId) -> Result<(), CartError> {
        let (user, remaining) = {
            let session = self.inner.session.lock();

            let Some(user) = session.signed_in_id() else {
                return Ok(());
            };

            if !session.cart.contains(product) {
                return Ok(());
            }

            (user, session.cart.without(product))
        };

        self.inner
            .users
            .replace_cart(&user, remaining.into_items())
            .await
            .map_err(|e| {
                error!(%user, %product, "failed to remove cart item: {e}");

                CartError::Persistence(e)
            })
    }

    /// Empty the cart. Signed out, only the local view is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] when the write fails.
    pub async fn clear(&self) -> Result<(), CartError> {
        let user = {
            let mut session = self.inner.session.lock();

            let Some(user) = session.signed_in_id() else {
                session.cart = Cart::default();

                self.inner
                    .events
                    .publish(StorefrontEvent::CartChanged { count: 0 });

                return Ok(());
            };

            user
        };

        self.clear_for(&user).await
    }

    /// Empty `user`'s persisted cart, whoever is signed in now. The local
    /// view follows through snapshots only while `user` is still signed in.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] when the write fails.
    pub async fn clear_for(&self, user: &UserId) -> Result<(), CartError> {
        self.inner
            .users
            .replace_cart(user, Vec::new())
            .await
            .map_err(|e| {
                error!(%user, "failed to clear cart: {e}");

                CartError::Persistence(e)
            })
    }

    pub fn request_open(&self) {
        self.inner.events.publish(StorefrontEvent::OpenRequested);
    }

    pub fn request_close(&self) {
        self.inner.events.publish(StorefrontEvent::CloseRequested);
    }

    /// Signed-in user, if any.
    pub fn user(&self) -> Option<AuthUser> {
        self.inner.session.lock().user.clone()
    }

    /// Snapshot of the cart as last delivered.
    pub fn cart(&self) -> Cart {
        self.inner.session.lock().cart.clone()
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.cart().into_items()
    }

    pub fn count(&self) -> usize {
        self.inner.session.lock().cart.len()
    }

    pub fn contains(&self, product: &ProductId) -> bool {
        self.inner.session.lock().cart.contains(product)
    }

    /// Sum of the advisory display prices.
    pub fn subtotal(&self) -> u64 {
        self.inner.session.lock().cart.subtotal()
    }

    pub(crate) fn remember_return_location(&self, return_to: &str) {
        self.inner.session.lock().return_to = Some(return_to.to_string());
    }

    /// Location a deferred action asked to return to after sign-in.
    pub fn take_return_location(&self) -> Option<String> {
        self.inner.session.lock().return_to.take()
    }

    /// Validate `code` against the current subtotal and hold it on success.
    ///
    /// A rejected code leaves any previously applied coupon in place.
    ///
    /// # Errors
    ///
    /// Returns the validator's [`CouponError`].
    pub async fn apply_coupon(
        &self,
        coupons: &dyn CouponsService,
        code: &str,
    ) -> Result<CouponQuote, CouponError> {
        let quote = coupons.apply(code, self.subtotal()).await?;

        self.set_coupon(quote.coupon.clone());

        Ok(quote)
    }

    pub fn set_coupon(&self, coupon: AppliedCoupon) {
        self.inner.session.lock().coupon = Some(coupon);
    }

    /// Drop the applied coupon. Local only; usage is counted at checkout.
    pub fn clear_coupon(&self) {
        self.inner.session.lock().coupon = None;
    }

    /// Drop the applied coupon if `user` is still signed in.
    pub fn clear_coupon_for(&self, user: &UserId) {
        let mut session = self.inner.session.lock();

        if session.user.as_ref().is_some_and(|signed_in| &signed_in.id == user) {
            session.coupon = None;
        }
    }

    pub fn applied_coupon(&self) -> Option<AppliedCoupon> {
        self.inner.session.lock().coupon.clone()
    }

    /// Coupon discount on the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the calculation overflows.
    pub fn discount(&self) -> Result<u64, DiscountError> {
        let session = self.inner.session.lock();

        match &session.coupon {
            Some(coupon) => coupon.discount_for(session.cart.subtotal()),
            None => Ok(0),
        }
    }

    /// Subtotal less the coupon discount.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the calculation overflows.
    pub fn total(&self) -> Result<u64, DiscountError> {
        let discount = self.discount()?;

        Ok(self.subtotal().saturating_sub(discount))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;
    use tokio::sync::watch;

    use crate::{
        backend::{BackendError, MockUsersRepository},
        domain::coupons::MockCouponsService,
        test::{TestContext, product},
    };

    use super::*;

    #[tokio::test]
    async fn subscribe_loads_persisted_cart() -> TestResult {
        let ctx = TestContext::new();

        ctx.backend.update_user(&ctx.user.id, |record| {
            record.my_cart.merge(CartItem::from(&product("p1", 1_000)));
        });

        ctx.sign_in().await?;

        assert_eq!(ctx.cart.count(), 1);
        assert_eq!(ctx.cart.user().map(|u| u.id), Some(ctx.user.id.clone()));

        Ok(())
    }

    #[tokio::test]
    async fn add_writes_and_snapshot_updates_cart() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.seed_product("p1", 1_000);

        ctx.sign_in().await?;

        let mut events = ctx.cart.events();

        let outcome = ctx.cart.add(&product, "/products/p1").await?;

        assert_eq!(outcome, AddOutcome::Added);

        ctx.wait_for_count(1).await?;

        assert!(ctx.cart.contains(&product.id));
        assert_eq!(ctx.cart.subtotal(), 1_000);

        let mut seen = Vec::new();

        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }

        assert!(seen.contains(&StorefrontEvent::OpenRequested));
        assert!(seen.contains(&StorefrontEvent::CartChanged { count: 1 }));

        ctx.cart.request_close();

        assert_eq!(events.try_recv()?, StorefrontEvent::CloseRequested);

        Ok(())
    }

    #[tokio::test]
    async fn adding_same_product_twice_keeps_one_item() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.seed_product("p1", 1_000);

        ctx.sign_in().await?;

        ctx.cart.add(&product, "/").await?;
        ctx.wait_for_count(1).await?;

        let outcome = ctx.cart.add(&product, "/").await?;

        assert_eq!(outcome, AddOutcome::AlreadyInCart);
        assert_eq!(ctx.cart.count(), 1);

        let record = ctx.backend.user(&ctx.user.id).ok_or("user missing")?;

        assert_eq!(record.my_cart.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_when_signed_out_remembers_return_location() {
        let ctx = TestContext::new();
        let product = ctx.seed_product("p1", 1_000);

        let result = ctx.cart.add(&product, "/products/p1").await;

        assert!(
            matches!(&result, Err(CartError::Unauthenticated { return_to }) if return_to == "/products/p1"),
            "expected Unauthenticated, got {result:?}"
        );
        assert_eq!(
            ctx.cart.take_return_location().as_deref(),
            Some("/products/p1")
        );
        assert_eq!(ctx.cart.take_return_location(), None);
    }

    #[tokio::test]
    async fn remove_absent_product_is_a_no_op() -> TestResult {
        let mut users = MockUsersRepository::new();
        let (_sender, receiver) = watch::channel(None);

        users.expect_watch_user().return_once(move |_| Ok(receiver));
        users.expect_replace_cart().never();

        let store = CartStore::new(Arc::new(users));

        store.remove(&ProductId::new("p1")).await?;

        store.subscribe(crate::test::buyer()).await?;
        store.remove(&ProductId::new("p1")).await?;

        Ok(())
    }

    #[tokio::test]
    async fn remove_writes_remaining_items() -> TestResult {
        let ctx = TestContext::new();
        let first = ctx.seed_product("p1", 1_000);
        let second = ctx.seed_product("p2", 2_000);

        ctx.sign_in().await?;
        ctx.cart.add(&first, "/").await?;
        ctx.cart.add(&second, "/").await?;
        ctx.wait_for_count(2).await?;

        ctx.cart.remove(&first.id).await?;
        ctx.wait_for_count(1).await?;

        assert_eq!(
            ctx.cart.items().first().map(|item| item.product_id.clone()),
            Some(second.id)
        );

        Ok(())
    }

    #[tokio::test]
    async fn clear_signed_out_only_resets_local_view() -> TestResult {
        let users = MockUsersRepository::new();
        let store = CartStore::new(Arc::new(users));
        let mut events = store.events();

        store.clear().await?;

        assert_eq!(store.count(), 0);
        assert_eq!(events.try_recv()?, StorefrontEvent::CartChanged { count: 0 });

        Ok(())
    }

    #[tokio::test]
    async fn write_failure_is_reported_and_cart_left_to_snapshots() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.seed_product("p1", 1_000);

        ctx.sign_in().await?;
        ctx.backend.fail(crate::backend::Operation::CartWrite);

        let result = ctx.cart.add(&product, "/").await;

        assert!(
            matches!(
                result,
                Err(CartError::Persistence(BackendError::Unavailable(_)))
            ),
            "expected Persistence, got {result:?}"
        );
        assert_eq!(ctx.cart.count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn dispose_detaches_subscription() -> TestResult {
        let ctx = TestContext::new();
        let first = ctx.seed_product("p1", 1_000);

        ctx.sign_in().await?;
        ctx.cart.add(&first, "/").await?;
        ctx.wait_for_count(1).await?;

        ctx.cart.dispose();

        assert_eq!(ctx.cart.count(), 0);
        assert_eq!(ctx.cart.user(), None);

        let mut events = ctx.cart.events();

        ctx.backend.update_user(&ctx.user.id, |record| {
            record.my_cart.merge(CartItem::from(&product("p2", 2_000)));
        });

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(ctx.cart.count(), 0);
        assert!(events.try_recv().is_err(), "no events after dispose");

        Ok(())
    }

    #[tokio::test]
    async fn resubscribing_replaces_previous_user() -> TestResult {
        let ctx = TestContext::new();
        let other = AuthUser {
            id: UserId::new("u2"),
            email: "other@example.com".to_string(),
            display_name: None,
        };

        ctx.sign_in().await?;
        ctx.cart.subscribe(other.clone()).await?;

        ctx.backend.update_user(&ctx.user.id, |record| {
            record.my_cart.merge(CartItem::from(&product("p1", 1_000)));
        });

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(ctx.cart.count(), 0, "first user's cart must not leak in");

        ctx.backend.update_user(&other.id, |record| {
            record.my_cart.merge(CartItem::from(&product("p2", 2_000)));
        });

        ctx.wait_for_count(1).await?;

        assert!(ctx.cart.contains(&ProductId::new("p2")));

        Ok(())
    }

    #[tokio::test]
    async fn clearing_another_user_leaves_session_alone() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.seed_product("p1", 1_000);
        let other = UserId::new("u2");

        ctx.backend.update_user(&other, |record| {
            record.my_cart.merge(CartItem::from(&product));
        });

        ctx.sign_in().await?;
        ctx.cart.add(&product, "/").await?;
        ctx.wait_for_count(1).await?;
        ctx.cart.set_coupon(AppliedCoupon {
            coupon_id: CouponId::new("c1"),
            code: "SAVE".to_string(),
            discount_percent: 10,
        });

        ctx.cart.clear_for(&other).await?;
        ctx.cart.clear_coupon_for(&other);

        assert_eq!(
            ctx.backend.user(&other).map(|record| record.my_cart.len()),
            Some(0)
        );
        assert_eq!(ctx.cart.count(), 1);
        assert!(ctx.cart.applied_coupon().is_some());

        ctx.cart.clear_coupon_for(&ctx.user.id);

        assert_eq!(ctx.cart.applied_coupon(), None);

        Ok(())
    }

    #[tokio::test]
    async fn discount_follows_live_subtotal() -> TestResult {
        let ctx = TestContext::new();
        let first = ctx.seed_product("p1", 1_250);
        let second = ctx.seed_product("p2", 2_000);

        ctx.seed_coupon("c1", "SAVE15", 15);
        ctx.sign_in().await?;
        ctx.cart.add(&first, "/").await?;
        ctx.wait_for_count(1).await?;

        let quote = ctx.cart.apply_coupon(ctx.app.coupons.as_ref(), "save15").await?;

        assert_eq!(quote.discount_amount, 188);
        assert_eq!(ctx.cart.discount()?, 188);

        ctx.cart.add(&second, "/").await?;
        ctx.wait_for_count(2).await?;

        // 15% of 3250 = 487.5
        assert_eq!(ctx.cart.discount()?, 488);
        assert_eq!(ctx.cart.total()?, 2_762);

        ctx.cart.clear_coupon();

        assert_eq!(ctx.cart.discount()?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn rejected_coupon_keeps_previous_coupon() -> TestResult {
        let store = CartStore::new(Arc::new(MockUsersRepository::new()));
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_apply()
            .once()
            .returning(|_, _| Err(CouponError::LimitReached));

        let previous = AppliedCoupon {
            coupon_id: CouponId::new("c0"),
            code: "OLD".to_string(),
            discount_percent: 5,
        };

        store.set_coupon(previous.clone());

        let result = store.apply_coupon(&coupons, "FULL").await;

        assert!(
            matches!(result, Err(CouponError::LimitReached)),
            "expected LimitReached, got {result:?}"
        );
        assert_eq!(store.applied_coupon(), Some(previous));

        Ok(())
    }
}
