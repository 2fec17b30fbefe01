use clap::{Args, Subcommand};
use serde_json::json;
use storefront::{
    context::AppContext,
    domain::{
        carts::{CartError, CartService, ClearOutcome},
        products::models::ProductId,
        users::UserId,
    },
};

use super::output::{Output, render_cart};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    /// User whose cart is used
    #[arg(long, global = true)]
    user: Option<i64>,

    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and its total
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        product: i64,
    },
    /// Set a line's quantity
    Set {
        /// Product id
        product: i64,

        /// New quantity; must be at least 1
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product's line
    Remove {
        /// Product id
        product: i64,
    },
    /// Empty the cart
    Clear,
}

fn describe(error: &CartError) -> String {
    format!("{}: {error}", error.kind().message())
}

pub(crate) async fn run(app: &AppContext, command: CartCommand, output: &Output) -> Result<(), String> {
    let mut cart = app.cart_service();

    // Without --user the service stays detached and every mutation is refused.
    if let Some(user) = command.user {
        cart.attach_user(UserId::from(user))
            .await
            .map_err(|error| describe(&error))?;
    }

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product } => {
            cart.add_item_by_id(ProductId::from(product))
                .await
                .map_err(|error| describe(&error))?;
        }
        CartSubcommand::Set { product, quantity } => {
            cart.update_quantity(ProductId::from(product), quantity)
                .await
                .map_err(|error| describe(&error))?;
        }
        CartSubcommand::Remove { product } => {
            cart.remove_item(ProductId::from(product))
                .await
                .map_err(|error| describe(&error))?;
        }
        CartSubcommand::Clear => return clear(&mut cart, output).await,
    }

    if cart.user().is_none() {
        return Err(describe(&CartError::NoUserLoggedIn));
    }

    output.emit(&cart.snapshot(), render_cart)
}

async fn clear(cart: &mut CartService, output: &Output) -> Result<(), String> {
    let outcome = cart.clear().await.map_err(|error| describe(&error))?;

    let diverged = outcome == ClearOutcome::StorageDiverged;

    output.emit(&json!({ "cleared": true, "storage_diverged": diverged }), |_| {
        if diverged {
            "cart emptied, but the stored cart could not be deleted".to_string()
        } else {
            "cart emptied".to_string()
        }
    })
}
