//! `catalog` command

use std::io;

use clap::Args;
use rustc_hash::FxHashSet;

use satchel::{
    catalog::{CatalogFilter, CatalogSort, browse},
    prelude::*,
};
use satchel_app::{
    backend::{InMemoryBackend, ProductsRepository},
    context::AppContext,
};

use crate::{commands::CommandError, render::write_catalog};

#[derive(Debug, Args)]
pub(crate) struct CatalogArgs {
    /// Text to find in titles and descriptions
    #[arg(long)]
    query: Option<String>,

    /// Only this file type, e.g. pdf
    #[arg(long)]
    file_type: Option<String>,

    /// Only this delivery type (file, url)
    #[arg(long)]
    delivery: Option<String>,

    /// Highest price to list
    #[arg(long)]
    max_price: Option<u64>,

    /// Order: newest, price-asc, price-desc, title
    #[arg(long, default_value = "newest")]
    sort: CatalogSort,

    /// Show purchase buttons as this user sees them
    #[arg(long)]
    user: Option<String>,
}

pub(crate) async fn run(
    args: CatalogArgs,
    app: &AppContext,
    backend: &InMemoryBackend,
    out: impl io::Write,
) -> Result<(), CommandError> {
    let products = app.products.list_products().await?;

    let filter = CatalogFilter {
        query: args.query,
        file_type: args.file_type,
        delivery: args.delivery,
        max_price: args.max_price,
        ..CatalogFilter::default()
    };

    let (cart, owned) = if let Some(user) = args.user {
        let record = backend
            .user(&UserId::new(user.as_str()))
            .ok_or(CommandError::UnknownUser(user))?;

        let owned: FxHashSet<ProductId> = record.purchased_products.into_iter().collect();

        (record.my_cart, owned)
    } else {
        (Cart::default(), FxHashSet::default())
    };

    let listed = browse(&products, &filter, args.sort);

    write_catalog(out, &listed, &cart, &owned, &app.settings)?;

    Ok(())
}
