//! Storefront services: the live cart, coupon validation and checkout,
//! wired over a document store.

pub mod backend;
pub mod context;
pub mod domain;
pub mod events;
pub mod settings;

#[cfg(test)]
mod test;
