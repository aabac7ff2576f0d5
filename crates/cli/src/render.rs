//! Table output

use std::io;

use rustc_hash::FxHashSet;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};

use satchel::{
    catalog::purchase_button,
    format::{format_date, format_date_time, format_discount},
    prelude::*,
};
use satchel_app::{domain::checkout::CheckoutReceipt, settings::StoreSettings};

/// Write the product listing, with purchase buttons for the viewer's state.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_catalog(
    mut out: impl io::Write,
    products: &[&Product],
    cart: &Cart,
    owned: &FxHashSet<ProductId>,
    settings: &StoreSettings,
) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products match.");
    }

    let mut builder = Builder::default();

    builder.push_record(["Product", "Type", "Delivery", "Price", "Published", ""]);

    for product in products {
        builder.push_record([
            product.title.clone(),
            product.file_type.clone().unwrap_or_default(),
            product.delivery.kind().to_string(),
            settings.format_price(product.price),
            product
                .created_at
                .map(|at| format_date(at, &settings.time_zone))
                .unwrap_or_default(),
            purchase_button(&product.id, cart, owned).label().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}")
}

/// Write an order summary.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_receipt(
    mut out: impl io::Write,
    receipt: &CheckoutReceipt,
    settings: &StoreSettings,
) -> io::Result<()> {
    let order = &receipt.order;
    let mut builder = Builder::default();

    builder.push_record(["Item", "Delivery", "Price"]);

    for line in &order.items {
        builder.push_record([
            line.title.clone(),
            line.delivery.location().to_string(),
            settings.format_price(line.price),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..3), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "{table}")?;
    writeln!(out, " Order:     {}", receipt.order_id)?;
    writeln!(
        out,
        " Placed:    {}",
        format_date_time(order.created_at, &settings.time_zone)
    )?;
    writeln!(out, " Subtotal:  {}", settings.format_price(order.original_total))?;

    if let Some(code) = &order.coupon_code {
        writeln!(
            out,
            " Coupon:    {code} ({}%) {}",
            order.coupon_discount_percent,
            format_discount(order.discount_amount, settings.currency)
        )?;
    }

    writeln!(out, " Total:     {}", settings.format_price(order.final_total))?;
    writeln!(out, " Status:    {}", status_label(order.status))?;
    writeln!(out, " Continue:  {}", receipt.redirect_to)
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending payment",
        OrderStatus::Completed => "completed",
    }
}
