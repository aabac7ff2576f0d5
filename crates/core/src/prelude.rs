//! Common imports for storefront code.

pub use crate::{
    cart::{Cart, CartItem},
    catalog::{Delivery, Product, ProductId},
    coupons::{AppliedCoupon, Coupon, CouponId, CouponRejection},
    discounts::DiscountError,
    orders::{CheckoutPath, Order, OrderId, OrderItem, OrderStatus, PaymentMethod},
    users::{AuthUser, UserId, UserRecord},
};
