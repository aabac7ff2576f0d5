//! Checkout errors.

use thiserror::Error;

use satchel::discounts::DiscountError;

use crate::{backend::BackendError, domain::coupons::CouponError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign-in required")]
    Unauthenticated { return_to: String },

    #[error("cart is empty")]
    EmptyCart,

    #[error("a checkout is already in progress")]
    InProgress,

    #[error("products no longer available: {}", titles.join(", "))]
    MissingProducts { titles: Vec<String> },

    #[error("applied coupon rejected")]
    Coupon(#[source] CouponError),

    #[error("invalid discount")]
    Discount(#[from] DiscountError),

    #[error("order storage error")]
    Persistence(#[source] BackendError),
}

impl From<BackendError> for CheckoutError {
    fn from(error: BackendError) -> Self {
        Self::Persistence(error)
    }
}

impl CheckoutError {
    /// Message shown to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated { .. } => "Please sign in to check out.".to_string(),
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::InProgress => "Your order is already being placed.".to_string(),
            Self::MissingProducts { titles } => format!(
                "Some items are no longer available: {}. Remove them from your cart and try again.",
                titles.join(", ")
            ),
            Self::Coupon(e) => e.user_message().to_string(),
            Self::Discount(_) | Self::Persistence(_) => {
                "Something went wrong placing your order. Please try again.".to_string()
            }
        }
    }
}
