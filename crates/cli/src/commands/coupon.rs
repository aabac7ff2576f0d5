//! `coupon` command

use std::io;

use clap::Args;

use satchel::format::format_discount;
use satchel_app::{context::AppContext, domain::coupons::CouponsService};

use crate::commands::CommandError;

#[derive(Debug, Args)]
pub(crate) struct CouponArgs {
    /// Coupon code
    code: String,

    /// Subtotal to discount
    #[arg(long)]
    subtotal: u64,
}

pub(crate) async fn run(
    args: CouponArgs,
    app: &AppContext,
    mut out: impl io::Write,
) -> Result<(), CommandError> {
    let CouponArgs { code, subtotal } = args;

    let quote = app.coupons.apply(&code, subtotal).await?;
    let total = subtotal.saturating_sub(quote.discount_amount);

    writeln!(
        out,
        "{} ({}% off)",
        quote.coupon.code, quote.coupon.discount_percent
    )?;
    writeln!(out, " Subtotal:  {}", app.settings.format_price(subtotal))?;
    writeln!(
        out,
        " Discount:  {}",
        format_discount(quote.discount_amount, app.settings.currency)
    )?;
    writeln!(out, " Total:     {}", app.settings.format_price(total))?;

    Ok(())
}
