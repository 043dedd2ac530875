//! CLI module - command-line interface
//!
//! One positional argument, the target URL. Validation is done here rather
//! than by clap so missing or malformed arguments exit with code 1 and a
//! usage hint instead of clap's own error handling.

use clap::Parser;

use crate::core::{Result, WatchError};

/// sitewatch - rotating device-emulation screenshot monitor
#[derive(Parser, Debug)]
#[command(name = "sitewatch")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Target URL to monitor (must start with http:// or https://)
    pub url: Option<String>,
}

/// Extract and validate the target URL.
///
/// The URL is returned unchanged on success: no normalization, no
/// percent-encoding checks, just the scheme prefix.
pub fn validate_url(arg: Option<&str>) -> Result<String> {
    let url = arg.ok_or(WatchError::MissingArgument)?;

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(WatchError::InvalidScheme(url.to_string()))
    }
}
