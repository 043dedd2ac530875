//! sitewatch - Rotating Device-Emulation Screenshot Monitor
//!
//! Drives a headless Chromium browser through a fixed rotation of device
//! emulation profiles against a single target URL, capturing a full-page
//! screenshot and basic diagnostics per visit on a fixed interval, until
//! interrupted or an iteration cap is reached.
//!
//! # Architecture
//!
//! - **Core**: shared types, configuration, and error handling
//! - **Devices**: the fixed, ordered device profile catalog
//! - **Session**: one visit from browser launch to idempotent cleanup
//! - **Monitor**: the rotation loop and the shutdown coordinator
//! - **CLI**: argument parsing and validation
//!
//! # Usage
//!
//! ```rust,no_run
//! use sitewatch::{Config, Monitor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut monitor = Monitor::new("https://example.com", Config::load());
//!     monitor.run().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod devices;
pub mod monitor;
pub mod session;

// Re-export commonly used items
pub use core::{Config, Result, WatchError};
pub use devices::{DeviceCatalog, DeviceCategory, DeviceProfile};
pub use monitor::{Monitor, RunCounters, Shutdown};
pub use session::VisitSession;
