//! Human and JSON rendering of command results.

use serde::Serialize;
use storefront::{
    domain::carts::models::{CartLine, CartSnapshot},
    money::format_amount,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Output {
    json: bool,
}

impl Output {
    pub(crate) fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or the `human` rendering of it.
    #[expect(clippy::print_stdout, reason = "command results are the CLI's stdout")]
    pub(crate) fn emit<T, F>(&self, value: &T, human: F) -> Result<(), String>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        if self.json {
            let rendered = serde_json::to_string_pretty(value)
                .map_err(|error| format!("failed to serialize output: {error}"))?;

            println!("{rendered}");
        } else {
            println!("{}", human(value));
        }

        Ok(())
    }
}

fn format_total(amount: Option<u64>) -> String {
    amount.map_or_else(|| "overflow".to_string(), format_amount)
}

pub(crate) fn render_line(line: &CartLine) -> String {
    format!(
        "{:>6}  {:<32} {:>4} x {:>10} = {:>10}",
        line.product.id,
        line.product.name,
        line.quantity,
        format_amount(line.product.price),
        format_total(line.line_total()),
    )
}

pub(crate) fn render_cart(cart: &CartSnapshot) -> String {
    if cart.is_empty() {
        return "cart is empty".to_string();
    }

    let mut rendered = cart
        .lines
        .iter()
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n");

    rendered.push_str(&format!("\ntotal: {}", format_total(cart.total())));

    rendered
}
