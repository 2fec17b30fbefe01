//! Storefront CLI

use std::process::ExitCode;

use crate::cli::{Cli, observability};

mod cli;

/// Run one CLI command and map its outcome to an exit code.
#[tokio::main]
pub async fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(error) => error.exit(),
    };

    if let Err(error) = observability::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("failed to initialize logging: {error}");
        }

        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            #[expect(clippy::print_stderr, reason = "errors are reported to the operator")]
            {
                eprintln!("{message}");
            }

            ExitCode::FAILURE
        }
    }
}
