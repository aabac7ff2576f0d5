//! Cart store errors.

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("sign-in required")]
    Unauthenticated { return_to: String },

    #[error("cart storage error")]
    Persistence(#[source] BackendError),
}

impl CartError {
    /// Message shown to the shopper.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "Please sign in to use your cart.",
            Self::Persistence(_) => "Something went wrong updating your cart. Please try again.",
        }
    }
}
