//! Satchel
//!
//! Storefront domain for digital educational materials: catalog products,
//! carts, coupons and orders, plus the formatting helpers used to display
//! them. Everything here is pure; persistence and subscriptions live in
//! `satchel-app`.

pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod discounts;
pub mod format;
pub mod ids;
pub mod orders;
pub mod prelude;
pub mod users;
