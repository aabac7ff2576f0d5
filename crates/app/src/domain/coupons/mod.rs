//! Coupons

pub mod errors;
pub mod service;

pub use errors::CouponError;
pub use service::*;
