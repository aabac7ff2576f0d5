//! Coupons service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{error, info};

use satchel::{coupons::normalize_code, prelude::*};

use crate::{backend::CouponsRepository, domain::coupons::errors::CouponError};

/// A validated coupon and its discount on the subtotal it was checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponQuote {
    pub coupon: AppliedCoupon,
    pub discount_amount: u64,
}

#[derive(Clone)]
pub struct BackendCouponsService {
    repository: Arc<dyn CouponsRepository>,
}

impl BackendCouponsService {
    #[must_use]
    pub fn new(repository: Arc<dyn CouponsRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CouponsService for BackendCouponsService {
    async fn apply(&self, code: &str, subtotal: u64) -> Result<CouponQuote, CouponError> {
        self.apply_at(code, subtotal, Timestamp::now()).await
    }

    async fn apply_at(
        &self,
        code: &str,
        subtotal: u64,
        now: Timestamp,
    ) -> Result<CouponQuote, CouponError> {
        let code = normalize_code(code);

        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        let coupon = self
            .repository
            .find_by_code(&code)
            .await
            .map_err(|e| {
                error!(%code, "failed to look up coupon: {e}");

                e
            })?
            .ok_or(CouponError::NotFound)?;

        coupon.check(now)?;

        let applied = AppliedCoupon::from(&coupon);
        let discount_amount = applied.discount_for(subtotal)?;

        info!(
            %code,
            percent = applied.discount_percent,
            discount_amount,
            "coupon applied"
        );

        Ok(CouponQuote {
            coupon: applied,
            discount_amount,
        })
    }

    async fn redeem(&self, coupon: &CouponId) -> Result<(), CouponError> {
        self.repository.increment_usage(coupon).await?;

        info!(%coupon, "coupon redeemed");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Validate `code` now and quote its discount on `subtotal`.
    async fn apply(&self, code: &str, subtotal: u64) -> Result<CouponQuote, CouponError>;

    /// Validate `code` as of `now` and quote its discount on `subtotal`.
    async fn apply_at(
        &self,
        code: &str,
        subtotal: u64,
        now: Timestamp,
    ) -> Result<CouponQuote, CouponError>;

    /// Count one completed redemption.
    async fn redeem(&self, coupon: &CouponId) -> Result<(), CouponError>;
}
