use clap::Args;
use storefront::{
    context::AppContext,
    domain::{orders::CheckoutError, users::UserId},
    money::format_amount,
};

use super::output::Output;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// User whose cart is checked out
    #[arg(long)]
    user: i64,
}

pub(crate) async fn run(app: &AppContext, args: CheckoutArgs, output: &Output) -> Result<(), String> {
    let mut cart = app.cart_service();

    cart.attach_user(UserId::from(args.user))
        .await
        .map_err(|error| format!("{}: {error}", error.kind().message()))?;

    let receipt = app
        .checkout
        .checkout(&mut cart)
        .await
        .map_err(|error: CheckoutError| format!("{}: {error}", error.kind().message()))?;

    output.emit(&receipt, |receipt| {
        format!(
            "order {} placed, payment {} of {} recorded for {} line(s)",
            receipt.order,
            receipt.payment,
            format_amount(receipt.amount),
            receipt.lines.len()
        )
    })
}
