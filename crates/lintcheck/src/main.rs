//! CLI entry point.
//!
//! Exits non-zero when the lint conclusion is failure or the run aborts.

use clap::Parser;
use lintcheck::config::Config;
use lintcheck::report::Conclusion;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    match lintcheck::run::run(&config).await {
        Ok(Conclusion::Success) => {}
        Ok(Conclusion::Failure) => std::process::exit(1),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    }
}
