//! sitewatch - Rotating Device-Emulation Screenshot Monitor
//!
//! Main entry point for the CLI application.

use clap::Parser;
use sitewatch::cli::{validate_url, Args};
use sitewatch::{Config, Monitor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let url = match validate_url(args.url.as_deref()) {
        Ok(url) => url,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("Usage: sitewatch <url>");
            std::process::exit(1);
        }
    };

    let config = Config::load();

    let mut monitor = Monitor::new(url, config);
    monitor.run().await?;

    Ok(())
}
