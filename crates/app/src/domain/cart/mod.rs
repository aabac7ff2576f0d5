//! Cart

pub mod errors;
pub mod store;

pub use errors::CartError;
pub use store::*;
