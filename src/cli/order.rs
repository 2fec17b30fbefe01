use clap::{Args, Subcommand};
use serde::Serialize;
use storefront::{
    context::AppContext,
    domain::orders::models::{Order, OrderId, Payment},
    errors::StorageError,
    money::format_amount,
};

use super::output::Output;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Show an order with its lines and payment
    Show {
        /// Order id
        id: i64,
    },
}

#[derive(Debug, Serialize)]
struct OrderView {
    order: Order,
    payment: Option<Payment>,
}

pub(crate) async fn run(app: &AppContext, command: OrderCommand, output: &Output) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Show { id } => show(app, OrderId::from(id), output).await,
    }
}

async fn show(app: &AppContext, id: OrderId, output: &Output) -> Result<(), String> {
    let order = app.orders.get_order(id).await.map_err(|error| match error {
        StorageError::NotFound => format!("order {id} not found"),
        error => format!("failed to load order {id}: {error}"),
    })?;

    let payment = match app.orders.get_payment_for_order(id).await {
        Ok(payment) => Some(payment),
        Err(StorageError::NotFound) => None,
        Err(error) => return Err(format!("failed to load payment for order {id}: {error}")),
    };

    output.emit(&OrderView { order, payment }, |view| {
        let mut rendered = format!(
            "order {} for user {} at {}\n",
            view.order.id, view.order.user, view.order.created_at
        );

        for line in &view.order.lines {
            rendered.push_str(&format!("{:>6}  x {}\n", line.product, line.quantity));
        }

        rendered.push_str(&format!("amount: {}", format_amount(view.order.amount)));

        if let Some(payment) = &view.payment {
            rendered.push_str(&format!("\npayment {}: {}", payment.id, format_amount(payment.amount)));
        }

        rendered
    })
}
