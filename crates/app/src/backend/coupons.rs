//! Coupons collection contract.

use async_trait::async_trait;
use mockall::automock;

use satchel::prelude::*;

use super::BackendError;

#[automock]
#[async_trait]
pub trait CouponsRepository: Send + Sync {
    /// Look up a coupon by its normalised code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, BackendError>;

    /// Atomically add one to `usageCount`.
    async fn increment_usage(&self, coupon: &CouponId) -> Result<(), BackendError>;
}
