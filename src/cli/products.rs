use storefront::{context::AppContext, domain::products::browse, money::format_amount};

use super::output::Output;

pub(crate) async fn run(app: &AppContext, output: &Output) -> Result<(), String> {
    let products = browse(app.catalog.as_ref()).await;

    output.emit(&products, |products| {
        if products.is_empty() {
            return "no products available".to_string();
        }

        products
            .iter()
            .map(|product| {
                format!(
                    "{:>6}  {:<32} {:>10}  {}",
                    product.id,
                    product.name,
                    format_amount(product.price),
                    product.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}
