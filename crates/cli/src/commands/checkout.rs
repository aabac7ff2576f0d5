//! `checkout` command

use std::{io, time::Duration};

use clap::Args;
use rustc_hash::FxHashSet;
use tokio::{sync::broadcast::error::RecvError, time::timeout};
use tracing::info;

use satchel::prelude::*;
use satchel_app::{
    backend::{InMemoryBackend, ProductsRepository},
    context::AppContext,
    domain::cart::CartStore,
    events::StorefrontEvent,
};

use crate::{commands::CommandError, render::write_receipt};

const CART_SYNC_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Shopper's user id
    #[arg(long)]
    pub(crate) user: String,

    /// Product id to add; repeat for more
    #[arg(long, required = true)]
    pub(crate) add: Vec<String>,

    /// Coupon code to apply
    #[arg(long)]
    pub(crate) coupon: Option<String>,
}

pub(crate) async fn run(
    args: CheckoutArgs,
    app: &AppContext,
    backend: &InMemoryBackend,
    out: impl io::Write,
) -> Result<(), CommandError> {
    let CheckoutArgs { user, add, coupon } = args;

    let record = backend
        .user(&UserId::new(user.as_str()))
        .ok_or(CommandError::UnknownUser(user))?;

    let buyer = AuthUser {
        email: record.email.clone().unwrap_or_default(),
        display_name: record.display_name.clone(),
        id: record.id,
    };

    app.cart.subscribe(buyer).await?;

    let result = shop(&add, coupon.as_deref(), app, out).await;

    app.cart.dispose();

    result
}

async fn shop(
    add: &[String],
    coupon: Option<&str>,
    app: &AppContext,
    mut out: impl io::Write,
) -> Result<(), CommandError> {
    let mut events = app.cart.events();
    let mut expected = app.cart.count();
    let mut seen = FxHashSet::default();

    for id in add.iter().filter(|id| seen.insert(id.as_str())) {
        let product = app
            .products
            .get_product(&ProductId::new(id.as_str()))
            .await?
            .ok_or_else(|| CommandError::UnknownProduct(id.clone()))?;

        if app.cart.contains(&product.id) {
            continue;
        }

        app.cart.add(&product, &format!("/products/{id}")).await?;

        expected += 1;
    }

    wait_for_count(&app.cart, &mut events, expected).await?;

    if let Some(code) = coupon {
        let quote = app.cart.apply_coupon(app.coupons.as_ref(), code).await?;

        info!(code = %quote.coupon.code, discount = quote.discount_amount, "coupon held");
    }

    let receipt = app.checkout.checkout(&app.cart, "/cart").await?;

    write_receipt(&mut out, &receipt, &app.settings)?;

    Ok(())
}

/// Wait for snapshots to bring the cart to at least `expected` items.
async fn wait_for_count(
    cart: &CartStore,
    events: &mut tokio::sync::broadcast::Receiver<StorefrontEvent>,
    expected: usize,
) -> Result<(), CommandError> {
    let wait = async {
        while cart.count() < expected {
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    };

    timeout(CART_SYNC_TIMEOUT, wait)
        .await
        .map_err(|_elapsed| CommandError::CartTimeout)?;

    if cart.count() < expected {
        return Err(CommandError::CartTimeout);
    }

    Ok(())
}
