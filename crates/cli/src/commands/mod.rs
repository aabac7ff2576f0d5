//! CLI commands

use std::io;

use clap::Subcommand;
use thiserror::Error;

use satchel_app::{
    backend::{BackendError, InMemoryBackend},
    context::AppContext,
    domain::{cart::CartError, checkout::CheckoutError, coupons::CouponError},
};

pub(crate) mod catalog;
pub(crate) mod checkout;
pub(crate) mod coupon;

/// Storefront commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the catalog.
    Catalog(catalog::CatalogArgs),

    /// Check a coupon code against a subtotal.
    Coupon(coupon::CouponArgs),

    /// Run a shopping session and place an order.
    Checkout(checkout::CheckoutArgs),
}

/// Errors from running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No such user in the store.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// No such product in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// The cart never caught up with the added products.
    #[error("timed out waiting for the cart to update")]
    CartTimeout,

    /// Store read failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Coupon was rejected or could not be checked.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Checkout failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Output could not be written.
    #[error("failed to write output")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Message for the person at the terminal.
    pub fn user_message(&self) -> String {
        match self {
            Self::Cart(e) => e.user_message().to_string(),
            Self::Coupon(e) => e.user_message().to_string(),
            Self::Checkout(e) => e.user_message(),
            _ => self.to_string(),
        }
    }
}

impl Command {
    /// Run against `app`, whose store is `backend`.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the command.
    pub async fn run(
        self,
        app: &AppContext,
        backend: &InMemoryBackend,
        out: impl io::Write,
    ) -> Result<(), CommandError> {
        match self {
            Self::Catalog(args) => catalog::run(args, app, backend, out).await,
            Self::Coupon(args) => coupon::run(args, app, out).await,
            Self::Checkout(args) => checkout::run(args, app, backend, out).await,
        }
    }
}
