//! Coupon validation errors.

use thiserror::Error;

use satchel::{coupons::CouponRejection, discounts::DiscountError};

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("coupon code is empty")]
    EmptyCode,

    #[error("coupon not found")]
    NotFound,

    #[error("coupon is not active")]
    Inactive,

    #[error("coupon has expired")]
    Expired,

    #[error("coupon usage limit reached")]
    LimitReached,

    #[error("invalid discount")]
    Discount(#[from] DiscountError),

    #[error("coupon storage error")]
    Persistence(#[source] BackendError),
}

impl From<CouponRejection> for CouponError {
    fn from(rejection: CouponRejection) -> Self {
        match rejection {
            CouponRejection::Inactive => Self::Inactive,
            CouponRejection::Expired => Self::Expired,
            CouponRejection::LimitReached => Self::LimitReached,
        }
    }
}

impl From<BackendError> for CouponError {
    fn from(error: BackendError) -> Self {
        Self::Persistence(error)
    }
}

impl CouponError {
    /// Inline message shown next to the coupon field.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCode => "Enter a coupon code.",
            Self::NotFound => "That coupon code doesn't exist.",
            Self::Inactive => "That coupon is no longer active.",
            Self::Expired => "That coupon has expired.",
            Self::LimitReached => "That coupon has reached its usage limit.",
            Self::Discount(_) | Self::Persistence(_) => {
                "We couldn't check that coupon. Please try again."
            }
        }
    }

    /// Whether the shopper can fix this by changing the code.
    pub fn is_validation_failure(&self) -> bool {
        !matches!(self, Self::Discount(_) | Self::Persistence(_))
    }
}
