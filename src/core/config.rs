//! Configuration management for sitewatch
//!
//! Supports environment variables and runtime overrides. All knobs have
//! defaults chosen for unattended monitoring; there is deliberately no
//! configuration file.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration for sitewatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Browser launch and navigation configuration
    pub browser: BrowserConfig,
    /// Screenshot output configuration
    pub capture: CaptureConfig,
    /// Rotation loop configuration
    pub rotation: RotationConfig,
}

/// Browser launch and per-visit timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Maximum time to wait for the browser process to come up, in seconds
    pub launch_timeout_secs: u64,
    /// Maximum time to wait for the DOM to be parsed after navigation, in seconds
    pub page_load_timeout_secs: u64,
    /// Unconditional post-navigation delay for client-side initialization, in seconds
    pub settle_secs: u64,
    /// Chrome executable path (None = auto-detect)
    pub chrome_path: Option<String>,
}

/// Screenshot output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Directory screenshots are written to, relative to the working directory
    pub dir: String,
    /// Filename prefix for regular screenshots
    pub prefix: String,
    /// Filename prefix for error screenshots
    pub error_prefix: String,
}

/// Rotation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Seconds between visits
    pub interval_secs: u64,
    /// Granularity at which the inter-visit wait polls the shutdown flag, in milliseconds
    pub poll_interval_ms: u64,
    /// Iteration cap after which the run completes naturally
    pub max_iterations: u64,
    /// Grace delay between a shutdown signal and hard process exit, in seconds
    pub shutdown_grace_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            launch_timeout_secs: env_u64("SITEWATCH_LAUNCH_TIMEOUT_SECS", 30),
            page_load_timeout_secs: env_u64("SITEWATCH_PAGE_TIMEOUT_SECS", 60),
            settle_secs: env_u64("SITEWATCH_SETTLE_SECS", 20),
            chrome_path: env::var("SITEWATCH_CHROME").ok(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            dir: env::var("SITEWATCH_SCREENSHOT_DIR").unwrap_or_else(|_| "screenshots".to_string()),
            prefix: "screenshot".to_string(),
            error_prefix: "error".to_string(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval_secs: env_u64("SITEWATCH_INTERVAL_SECS", 60),
            poll_interval_ms: env_u64("SITEWATCH_POLL_INTERVAL_MS", 1000),
            max_iterations: env_u64("SITEWATCH_MAX_ITERATIONS", 1000),
            shutdown_grace_secs: env_u64("SITEWATCH_GRACE_SECS", 2),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            capture: CaptureConfig::default(),
            rotation: RotationConfig::default(),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Self {
        // Pick up a .env file if one exists
        let _ = dotenvy::dotenv();

        Self::default()
    }
}

impl BrowserConfig {
    /// Launch timeout as a Duration
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    /// Page-load timeout as a Duration
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Settle wait as a Duration
    pub fn settle_wait(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

impl RotationConfig {
    /// Inter-visit interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Shutdown-flag polling granularity as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Shutdown grace delay as a Duration
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.browser.launch_timeout_secs, 30);
        assert_eq!(config.browser.page_load_timeout_secs, 60);
        assert_eq!(config.browser.settle_secs, 20);
        assert_eq!(config.capture.dir, "screenshots");
        assert_eq!(config.rotation.interval_secs, 60);
        assert_eq!(config.rotation.max_iterations, 1000);
        assert_eq!(config.rotation.shutdown_grace_secs, 2);
    }

    #[test]
    fn test_duration_accessors() {
        let config = Config::default();
        assert_eq!(config.browser.launch_timeout(), Duration::from_secs(30));
        assert_eq!(config.rotation.poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.rotation.shutdown_grace(), Duration::from_secs(2));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("interval_secs"));
        assert!(json.contains("screenshots"));
    }
}
