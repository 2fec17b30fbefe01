use clap::{Parser, Subcommand};
use storefront::context::AppContext;

use self::{
    config::{CheckoutConfig, DatabaseConfig, LoggingConfig},
    output::Output,
};

mod cart;
mod checkout;
pub(crate) mod config;
mod migrate;
pub(crate) mod observability;
mod order;
mod output;
mod products;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart and checkout CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(flatten)]
    checkout: CheckoutConfig,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the catalog
    Products,
    /// Inspect or change a user's cart
    Cart(cart::CartCommand),
    /// Turn a user's cart into an order
    Checkout(checkout::CheckoutArgs),
    /// Read back placed orders
    Order(order::OrderCommand),
    /// Apply database migrations
    Migrate,
}

impl Cli {
    /// Parse arguments, falling back to the environment and `.env`.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let url = self.database.url()?;
        let output = Output::new(self.json);

        if matches!(self.command, Commands::Migrate) {
            return migrate::run(url, &output).await;
        }

        let app = AppContext::from_database_url(url, self.checkout.timeout())
            .await
            .map_err(|error| format!("{error}: {}", error_source(&error)))?;

        match self.command {
            Commands::Products => products::run(&app, &output).await,
            Commands::Cart(command) => cart::run(&app, command, &output).await,
            Commands::Checkout(args) => checkout::run(&app, args, &output).await,
            Commands::Order(command) => order::run(&app, command, &output).await,
            Commands::Migrate => Ok(()),
        }
    }
}

fn error_source(error: &dyn std::error::Error) -> String {
    error
        .source()
        .map_or_else(String::new, ToString::to_string)
}
