//! Storefront Domain Concerns

pub mod cart;
pub mod checkout;
pub mod coupons;
