//! Checkout

pub mod errors;
pub mod processor;

pub use errors::CheckoutError;
pub use processor::*;
