//! Checkout processor.
//!
//! Turns the signed-in user's cart into an order. Prices shown in the cart
//! are advisory; every line is re-read from the product collection before
//! the order is written.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::future::try_join_all;
use jiff::Timestamp;
use tracing::{error, info, warn};

use satchel::{orders::OrderDraft, prelude::*};

use crate::{
    backend::{OrdersRepository, ProductsRepository},
    domain::{cart::CartStore, checkout::errors::CheckoutError, coupons::CouponsService},
    settings::StoreSettings,
};

/// A placed order and where to send the buyer next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub order: Order,
    pub redirect_to: String,
}

/// Holds the in-progress flag for one checkout attempt.
struct CheckoutGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

pub struct CheckoutProcessor {
    products: Arc<dyn ProductsRepository>,
    orders: Arc<dyn OrdersRepository>,
    coupons: Arc<dyn CouponsService>,
    settings: StoreSettings,
    busy: AtomicBool,
}

impl CheckoutProcessor {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductsRepository>,
        orders: Arc<dyn OrdersRepository>,
        coupons: Arc<dyn CouponsService>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            products,
            orders,
            coupons,
            settings,
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a checkout is running. The checkout button stays disabled
    /// while this is `true`.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&self) -> Option<CheckoutGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CheckoutGuard { busy: &self.busy })
    }

    /// Place an order for everything in `cart`.
    ///
    /// With a 100% coupon applied the order is completed on the spot and the
    /// coupon's usage is counted; otherwise it is left pending for payment.
    /// On success the cart and the applied coupon are cleared.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Unauthenticated`] when signed out; `return_to` is
    ///   remembered for after sign-in.
    /// - [`CheckoutError::EmptyCart`] with nothing to buy.
    /// - [`CheckoutError::InProgress`] while another attempt is running.
    /// - [`CheckoutError::MissingProducts`] when any product was removed from
    ///   the catalog. Nothing is written.
    /// - [`CheckoutError::Coupon`] when the applied coupon no longer passes
    ///   validation. The coupon is dropped and nothing is written.
    /// - [`CheckoutError::Persistence`] when reading products or writing the
    ///   order fails.
    pub async fn checkout(
        &self,
        cart: &CartStore,
        return_to: &str,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let Some(buyer) = cart.user() else {
            cart.remember_return_location(return_to);

            return Err(CheckoutError::Unauthenticated {
                return_to: return_to.to_string(),
            });
        };

        let items = cart.items();

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let Some(_guard) = self.begin() else {
            return Err(CheckoutError::InProgress);
        };

        let applied = cart.applied_coupon();

        let lines = self.verify(&items).await?;
        let coupon = self.revalidate(cart, &buyer.id, applied, &lines).await?;
        let path = CheckoutPath::for_coupon(coupon.as_ref());

        let order = Order::build(OrderDraft {
            buyer: &buyer,
            items: lines,
            coupon: coupon.as_ref(),
            path,
            currency: self.settings.currency_code(),
            created_at: Timestamp::now(),
        })?;

        let order_id = self.orders.create_order(&order).await.map_err(|e| {
            error!(user = %buyer.id, "failed to create order: {e}");

            CheckoutError::Persistence(e)
        })?;

        info!(
            user = %buyer.id,
            order = %order_id,
            ?path,
            final_total = order.final_total,
            "order placed"
        );

        if let (CheckoutPath::ZeroCost, Some(coupon)) = (path, &coupon) {
            if let Err(e) = self.coupons.redeem(&coupon.coupon_id).await {
                warn!(coupon = %coupon.coupon_id, order = %order_id, "failed to count coupon usage: {e}");
            }
        }

        if let Err(e) = cart.clear_for(&buyer.id).await {
            error!(user = %buyer.id, order = %order_id, "order placed but cart not cleared: {e}");
        }

        cart.clear_coupon_for(&buyer.id);

        Ok(CheckoutReceipt {
            order_id,
            order,
            redirect_to: self.settings.library_path.clone(),
        })
    }

    /// Re-check the applied coupon against its record, quoted on the
    /// verified subtotal.
    async fn revalidate(
        &self,
        cart: &CartStore,
        buyer: &UserId,
        applied: Option<AppliedCoupon>,
        lines: &[OrderItem],
    ) -> Result<Option<AppliedCoupon>, CheckoutError> {
        let Some(applied) = applied else {
            return Ok(None);
        };

        let subtotal = lines
            .iter()
            .fold(0_u64, |total, line| total.saturating_add(line.price));

        match self.coupons.apply(&applied.code, subtotal).await {
            Ok(quote) => Ok(Some(quote.coupon)),
            Err(e) => {
                if e.is_validation_failure() {
                    warn!(user = %buyer, code = %applied.code, "applied coupon no longer valid: {e}");

                    cart.clear_coupon_for(buyer);
                }

                Err(CheckoutError::Coupon(e))
            }
        }
    }

    /// Re-read every product and price the lines from the product records.
    async fn verify(&self, items: &[CartItem]) -> Result<Vec<OrderItem>, CheckoutError> {
        let products = try_join_all(
            items
                .iter()
                .map(|item| self.products.get_product(&item.product_id)),
        )
        .await
        .map_err(|e| {
            error!("failed to verify cart products: {e}");

            CheckoutError::Persistence(e)
        })?;

        let mut lines = Vec::with_capacity(items.len());
        let mut missing = Vec::new();

        for (item, product) in items.iter().zip(products) {
            match product {
                Some(product) => lines.push(OrderItem::verified(item, &product)),
                None => missing.push(item.title.clone()),
            }
        }

        if !missing.is_empty() {
            warn!(missing = missing.len(), "cart references removed products");

            return Err(CheckoutError::MissingProducts { titles: missing });
        }

        Ok(lines)
    }
}
