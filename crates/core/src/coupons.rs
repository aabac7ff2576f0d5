//! Coupons
//!
//! A coupon grants a whole-percent discount off the cart subtotal. It is only
//! redeemable while it is active, before its expiry and below its usage limit.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, discount_for_points},
    ids::DocumentId,
};

/// Coupon document id
pub type CouponId = DocumentId<Coupon>;

/// Why a coupon that exists cannot be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CouponRejection {
    /// Switched off by an administrator.
    #[error("coupon is not active")]
    Inactive,

    /// Past its `validUntil` time.
    #[error("coupon has expired")]
    Expired,

    /// Redeemed `usageLimit` times already.
    #[error("coupon usage limit reached")]
    LimitReached,
}

/// Coupon record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Document id
    pub id: CouponId,

    /// Redemption code, stored normalised
    pub code: String,

    /// Discount in whole percent points
    pub discount_percent: u8,

    /// Administrative switch
    pub is_active: bool,

    /// Expiry; redeemable strictly before this time
    #[serde(default)]
    pub valid_until: Option<Timestamp>,

    /// Maximum completed redemptions
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Completed redemptions so far
    #[serde(default)]
    pub usage_count: u32,
}

impl Coupon {
    /// Check whether the coupon can be redeemed at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: inactive, then expired, then limit.
    pub fn check(&self, now: Timestamp) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }

        if self.valid_until.is_some_and(|until| until <= now) {
            return Err(CouponRejection::Expired);
        }

        if self
            .usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
        {
            return Err(CouponRejection::LimitReached);
        }

        Ok(())
    }

    /// Percent points, capped at 100.
    pub fn percent(&self) -> u8 {
        self.discount_percent.min(100)
    }
}

/// Normalise user input to the stored code form: trimmed, uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Coupon held in session state after a successful validation.
///
/// Only the percent is kept; the amount is always recomputed from the current
/// subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    /// Coupon record
    pub coupon_id: CouponId,

    /// Normalised code
    pub code: String,

    /// Discount in whole percent points
    pub discount_percent: u8,
}

impl AppliedCoupon {
    /// Discount for `subtotal`, rounded half-up to a whole unit.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the calculation overflows.
    pub fn discount_for(&self, subtotal: u64) -> Result<u64, DiscountError> {
        discount_for_points(self.discount_percent, subtotal)
    }

    /// Whether this coupon makes any cart free.
    pub fn is_full_discount(&self) -> bool {
        self.discount_percent >= 100
    }
}

impl From<&Coupon> for AppliedCoupon {
    fn from(coupon: &Coupon) -> Self {
        Self {
            coupon_id: coupon.id.clone(),
            code: coupon.code.clone(),
            discount_percent: coupon.percent(),
        }
    }
}
