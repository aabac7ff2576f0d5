//! Orders
//!
//! An [`Order`] is written once at checkout and never modified by the
//! storefront. Line prices come from the product records read during
//! checkout, not from the cart.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    cart::CartItem,
    catalog::{Delivery, Product, ProductId},
    coupons::AppliedCoupon,
    discounts::DiscountError,
    ids::DocumentId,
    users::{AuthUser, UserId},
};

/// Order document id
pub type OrderId = DocumentId<Order>;

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment confirmation.
    Pending,

    /// Paid or free; content is unlocked.
    Completed,
}

/// How the order is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Handed to the payment gateway.
    Gateway,

    /// Fully covered by a coupon.
    Coupon,
}

/// Checkout flavour, decided by the applied coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPath {
    /// Regular checkout; payment happens later.
    Standard,

    /// A 100% coupon covers the whole order.
    ZeroCost,
}

impl CheckoutPath {
    /// Pick the path for the applied coupon.
    pub fn for_coupon(coupon: Option<&AppliedCoupon>) -> Self {
        if coupon.is_some_and(AppliedCoupon::is_full_discount) {
            Self::ZeroCost
        } else {
            Self::Standard
        }
    }

    /// Status a new order on this path starts in.
    pub fn status(self) -> OrderStatus {
        match self {
            Self::Standard => OrderStatus::Pending,
            Self::ZeroCost => OrderStatus::Completed,
        }
    }

    /// Payment method recorded on the order.
    pub fn payment_method(self) -> PaymentMethod {
        match self {
            Self::Standard => PaymentMethod::Gateway,
            Self::ZeroCost => PaymentMethod::Coupon,
        }
    }
}

/// Order line: cart metadata with the verified price and delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Purchased product
    pub product_id: ProductId,

    /// Title
    pub title: String,

    /// Verified price
    pub price: u64,

    /// Preview image location
    #[serde(default)]
    pub preview_image: Option<String>,

    /// File type label
    #[serde(default)]
    pub file_type: Option<String>,

    /// Publishing author
    pub author_id: UserId,

    /// Delivery details
    #[serde(flatten)]
    pub delivery: Delivery,
}

impl OrderItem {
    /// Merge the cart's metadata with the authoritative product.
    pub fn verified(item: &CartItem, product: &Product) -> Self {
        Self {
            product_id: item.product_id.clone(),
            title: item.title.clone(),
            price: product.price,
            preview_image: item.preview_image.clone(),
            file_type: item.file_type.clone(),
            author_id: item.author_id.clone(),
            delivery: product.delivery.clone(),
        }
    }
}

/// Totals for a set of verified lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of verified prices
    pub original_total: u64,

    /// Coupon discount
    pub discount_amount: u64,

    /// Amount payable
    pub final_total: u64,
}

impl OrderTotals {
    /// Compute totals for `items`, discounted by `coupon` if present.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discount calculation overflows.
    pub fn compute(
        items: &[OrderItem],
        coupon: Option<&AppliedCoupon>,
    ) -> Result<Self, DiscountError> {
        let original_total = items
            .iter()
            .fold(0_u64, |total, item| total.saturating_add(item.price));

        let discount_amount = match coupon {
            Some(coupon) => coupon.discount_for(original_total)?.min(original_total),
            None => 0,
        };

        Ok(Self {
            original_total,
            discount_amount,
            final_total: original_total - discount_amount,
        })
    }
}

/// Order record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Buyer
    pub user_id: UserId,

    /// Buyer email
    pub user_email: String,

    /// Buyer name
    pub user_name: String,

    /// Verified lines
    pub items: Vec<OrderItem>,

    /// Sum of verified prices
    pub original_total: u64,

    /// Coupon discount
    pub discount_amount: u64,

    /// Amount payable
    pub final_total: u64,

    /// ISO 4217 code
    pub currency: String,

    /// Lifecycle state
    pub status: OrderStatus,

    /// Settlement method
    pub payment_method: PaymentMethod,

    /// Redeemed coupon code
    #[serde(default)]
    pub coupon_code: Option<String>,

    /// Redeemed percent points, `0` without a coupon
    pub coupon_discount_percent: u8,

    /// Creation time
    pub created_at: Timestamp,
}

/// Inputs for building an [`Order`].
#[derive(Debug, Clone)]
pub struct OrderDraft<'a> {
    /// Signed-in buyer
    pub buyer: &'a AuthUser,

    /// Verified lines
    pub items: Vec<OrderItem>,

    /// Applied coupon
    pub coupon: Option<&'a AppliedCoupon>,

    /// Checkout path
    pub path: CheckoutPath,

    /// ISO 4217 code
    pub currency: &'a str,

    /// Creation time
    pub created_at: Timestamp,
}

impl Order {
    /// Build an order from verified lines.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discount calculation overflows.
    pub fn build(draft: OrderDraft<'_>) -> Result<Self, DiscountError> {
        let totals = OrderTotals::compute(&draft.items, draft.coupon)?;

        Ok(Self {
            user_id: draft.buyer.id.clone(),
            user_email: draft.buyer.email.clone(),
            user_name: draft.buyer.name().to_string(),
            items: draft.items,
            original_total: totals.original_total,
            discount_amount: totals.discount_amount,
            final_total: totals.final_total,
            currency: draft.currency.to_string(),
            status: draft.path.status(),
            payment_method: draft.path.payment_method(),
            coupon_code: draft.coupon.map(|c| c.code.clone()),
            coupon_discount_percent: draft.coupon.map_or(0, |c| c.discount_percent),
            created_at: draft.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::coupons::CouponId;

    use super::*;

    fn line(id: &str, price: u64) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(id),
            title: format!("Title {id}"),
            price,
            preview_image: None,
            file_type: None,
            author_id: UserId::new("author-1"),
            delivery: Delivery::Url {
                access_url: format!("https://course.example.com/{id}"),
            },
        }
    }

    fn coupon(percent: u8) -> AppliedCoupon {
        AppliedCoupon {
            coupon_id: CouponId::new("c1"),
            code: "SAVE".to_string(),
            discount_percent: percent,
        }
    }

    fn buyer() -> AuthUser {
        AuthUser {
            id: UserId::new("u1"),
            email: "reader@example.com".to_string(),
            display_name: Some("Mina".to_string()),
        }
    }

    #[test]
    fn verified_line_uses_product_price() {
        let item = CartItem {
            product_id: ProductId::new("p1"),
            title: "Fractions".to_string(),
            display_price: 1_000,
            preview_image: None,
            file_type: Some("pdf".to_string()),
            author_id: UserId::new("author-1"),
        };

        let product = Product {
            id: ProductId::new("p1"),
            title: "Fractions (2nd edition)".to_string(),
            description: None,
            price: 1_500,
            delivery: Delivery::File {
                file_url: "https://files.example.com/p1.pdf".to_string(),
            },
            preview_image: None,
            file_type: Some("pdf".to_string()),
            author_id: UserId::new("author-1"),
            created_at: None,
        };

        let line = OrderItem::verified(&item, &product);

        assert_eq!(line.price, 1_500);
        assert_eq!(line.title, "Fractions");
        assert_eq!(line.delivery, product.delivery);
    }

    #[test]
    fn totals_without_coupon() -> TestResult {
        let totals = OrderTotals::compute(&[line("p1", 1_500), line("p2", 2_000)], None)?;

        assert_eq!(totals.original_total, 3_500);
        assert_eq!(totals.discount_amount, 0);
        assert_eq!(totals.final_total, 3_500);

        Ok(())
    }

    #[test]
    fn totals_with_coupon_round_half_up() -> TestResult {
        let totals = OrderTotals::compute(&[line("p1", 1_250)], Some(&coupon(15)))?;

        assert_eq!(totals.discount_amount, 188);
        assert_eq!(totals.final_total, 1_062);

        Ok(())
    }

    #[test]
    fn zero_cost_path_builds_completed_coupon_order() -> TestResult {
        let buyer = buyer();
        let coupon = coupon(100);
        let path = CheckoutPath::for_coupon(Some(&coupon));

        let order = Order::build(OrderDraft {
            buyer: &buyer,
            items: vec![line("p1", 4_000)],
            coupon: Some(&coupon),
            path,
            currency: "KRW",
            created_at: Timestamp::UNIX_EPOCH,
        })?;

        assert_eq!(path, CheckoutPath::ZeroCost);
        assert_eq!(order.final_total, 0);
        assert_eq!(order.discount_amount, 4_000);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.payment_method, PaymentMethod::Coupon);
        assert_eq!(order.coupon_code.as_deref(), Some("SAVE"));
        assert_eq!(order.coupon_discount_percent, 100);
        assert_eq!(order.user_name, "Mina");

        Ok(())
    }

    #[test]
    fn standard_path_without_coupon_is_pending() -> TestResult {
        let buyer = buyer();
        let path = CheckoutPath::for_coupon(None);

        let order = Order::build(OrderDraft {
            buyer: &buyer,
            items: vec![line("p1", 4_000)],
            coupon: None,
            path,
            currency: "KRW",
            created_at: Timestamp::UNIX_EPOCH,
        })?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Gateway);
        assert_eq!(order.coupon_code, None);
        assert_eq!(order.coupon_discount_percent, 0);

        Ok(())
    }

    #[test]
    fn order_serializes_with_document_field_names() -> TestResult {
        let buyer = buyer();

        let order = Order::build(OrderDraft {
            buyer: &buyer,
            items: vec![line("p1", 4_000)],
            coupon: None,
            path: CheckoutPath::Standard,
            currency: "KRW",
            created_at: Timestamp::UNIX_EPOCH,
        })?;

        let yaml = serde_norway::to_string(&order)?;

        assert!(yaml.contains("originalTotal: 4000"), "{yaml}");
        assert!(yaml.contains("paymentMethod: gateway"), "{yaml}");
        assert!(yaml.contains("deliveryType: url"), "{yaml}");

        Ok(())
    }
}
