//! Settlement node binary

#![recursion_limit = "256"]

use clap::Parser;
use settlement_node::{Cli, Command};

#[tokio::main]
async fn main() {
    init_tracing_subscriber();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => settlement_node::run(args).await,
        Command::Rollback(args) => settlement_node::rollback(args).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

/// Initializes the console tracing subscriber, filtered by `RUST_LOG` and defaulting to `info`.
fn init_tracing_subscriber() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
