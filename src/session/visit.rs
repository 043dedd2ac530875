//! Single-visit session
//!
//! One visit owns one browser process, one emulated page, and walks a strict
//! sequence: ensure output directory, launch, configure emulation, attach
//! observers, navigate, settle, capture, collect info. Any aborting failure
//! jumps to the terminal error state after a best-effort error screenshot.
//! Cleanup runs on every exit path and is idempotent, so the shutdown path may
//! invoke it concurrently with an in-flight stage.

use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::{emulation, network, security};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::core::{Config, Result, VisitResult, WatchError};
use crate::devices::DeviceProfile;
use crate::session::naming::{error_screenshot_filename, screenshot_filename};
use crate::session::observers::{Observers, PageTelemetry};

/// Live browser resources for one visit.
///
/// Kept behind a `Mutex<Option<..>>` so cleanup can take them exactly once,
/// from whichever path gets there first.
struct SessionResources {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    observers: Option<Observers>,
}

/// One end-to-end visit against one device profile.
pub struct VisitSession {
    url: String,
    profile: DeviceProfile,
    config: Config,
    resources: Mutex<Option<SessionResources>>,
    telemetry: StdMutex<Option<PageTelemetry>>,
}

impl VisitSession {
    /// Create a session for one visit. Nothing is launched until `run`.
    pub fn new(url: impl Into<String>, profile: DeviceProfile, config: Config) -> Self {
        Self {
            url: url.into(),
            profile,
            config,
            resources: Mutex::new(None),
            telemetry: StdMutex::new(None),
        }
    }

    /// The device profile this visit emulates
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Run the visit to its terminal state. Never panics, never propagates:
    /// every failure is folded into the returned result, and cleanup always
    /// runs before this returns.
    pub async fn run(&self) -> VisitResult {
        let result = match self.execute().await {
            Ok(result) => result,
            Err(err) => {
                eprintln!("❌ Visit failed: {err}");
                self.capture_error_screenshot().await;

                let http_status = match &err {
                    WatchError::Http(status) => *status,
                    _ => self.recorded_http_status(),
                };
                VisitResult::error(err.to_string()).with_http_status(http_status)
            }
        };

        self.cleanup().await;
        result
    }

    async fn execute(&self) -> Result<VisitResult> {
        self.ensure_screenshot_dir().await?;
        self.launch().await?;
        self.configure_emulation().await?;
        self.attach_observers().await?;
        self.navigate().await?;

        println!(
            "⏳ Settling {}s for client-side initialization",
            self.config.browser.settle_secs
        );
        sleep(self.config.browser.settle_wait()).await;

        let screenshot = self.capture().await;
        self.collect_info().await;

        let mut result = VisitResult::success().with_http_status(self.recorded_http_status());
        if let Some(path) = screenshot {
            result = result.with_screenshot(path);
        }
        Ok(result)
    }

    /// Release the visit's browser resources. Idempotent: the resources are
    /// taken out of their slot exactly once, so calling this from the shutdown
    /// path while the visit is mid-stage is safe. Close failures are logged
    /// and never prevent the remaining closes.
    pub async fn cleanup(&self) {
        let resources = { self.resources.lock().await.take() };
        let Some(resources) = resources else {
            return;
        };

        if let Some(observers) = &resources.observers {
            observers.detach();
        }

        if let Err(e) = resources.page.close().await {
            eprintln!("⚠️  {}", WatchError::close("page", e.to_string()));
        }

        let mut browser = resources.browser;
        if let Err(e) = browser.close().await {
            eprintln!("⚠️  {}", WatchError::close("browser", e.to_string()));
        }

        resources.handler_task.abort();
    }

    async fn ensure_screenshot_dir(&self) -> Result<()> {
        // create_dir_all is a no-op when the directory already exists, so a
        // concurrent check-then-create race cannot fail here
        tokio::fs::create_dir_all(&self.config.capture.dir).await?;
        Ok(())
    }

    async fn launch(&self) -> Result<()> {
        println!(
            "🚀 Launching headless browser ({}x{})",
            self.profile.viewport.width, self.profile.viewport.height
        );

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(self.profile.viewport.width, self.profile.viewport.height);
        if let Some(path) = &self.config.browser.chrome_path {
            builder = builder.chrome_executable(path.clone());
        }
        let chrome_config = builder.build().map_err(WatchError::Launch)?;

        let launch_timeout = self.config.browser.launch_timeout();
        let launched = timeout(launch_timeout, Browser::launch(chrome_config))
            .await
            .map_err(|_| {
                WatchError::launch(format!(
                    "browser did not start within {}s",
                    self.config.browser.launch_timeout_secs
                ))
            })?;
        let (browser, mut handler) = launched.map_err(|e| WatchError::launch(e.to_string()))?;

        // Drive the CDP event stream for the lifetime of the browser
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        let mut guard = self.resources.lock().await;
        *guard = Some(SessionResources {
            browser,
            page,
            handler_task,
            observers: None,
        });
        Ok(())
    }

    /// Apply the profile's emulation overrides and the TLS policy to the page.
    ///
    /// Certificate errors are ignored so visits proceed past self-signed or
    /// expired certs: broken TLS must not block visual verification.
    async fn configure_emulation(&self) -> Result<()> {
        let page = self.page().await?;

        let ignore_certs = security::SetIgnoreCertificateErrorsParams::builder()
            .ignore(true)
            .build()
            .map_err(WatchError::Emulation)?;
        page.execute(ignore_certs).await?;

        let metrics = emulation::SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(self.profile.viewport.width))
            .height(i64::from(self.profile.viewport.height))
            .device_scale_factor(self.profile.device_scale_factor)
            .mobile(self.profile.is_mobile)
            .build()
            .map_err(WatchError::Emulation)?;
        page.execute(metrics).await?;

        let user_agent = network::SetUserAgentOverrideParams::builder()
            .user_agent(self.profile.user_agent.as_str())
            .build()
            .map_err(WatchError::Emulation)?;
        page.execute(user_agent).await?;

        if self.profile.has_touch {
            let touch = emulation::SetTouchEmulationEnabledParams::builder()
                .enabled(true)
                .build()
                .map_err(WatchError::Emulation)?;
            page.execute(touch).await?;
        }

        Ok(())
    }

    async fn attach_observers(&self) -> Result<()> {
        let page = self.page().await?;
        let observers = Observers::attach(&page).await?;

        if let Ok(mut telemetry) = self.telemetry.lock() {
            *telemetry = Some(observers.telemetry());
        }

        let mut guard = self.resources.lock().await;
        match guard.as_mut() {
            Some(resources) => resources.observers = Some(observers),
            // Cleanup won the race; stop the freshly spawned tasks ourselves
            None => observers.detach(),
        }
        Ok(())
    }

    /// Navigate and wait until the DOM is parsed, bounded by the page-load
    /// timeout. A timeout is swallowed: slow client-side rendering must not
    /// abort the visit, and later stages work with whatever partial page
    /// state exists. A main-document status >= 400 aborts with `Http`.
    async fn navigate(&self) -> Result<()> {
        let page = self.page().await?;
        println!("🌐 Navigating to {}", self.url);

        let page_load_timeout = self.config.browser.page_load_timeout();
        match timeout(page_load_timeout, self.goto_and_wait_for_dom(&page)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => println!(
                "⏳ Page did not finish loading within {}s, continuing with partial state",
                self.config.browser.page_load_timeout_secs
            ),
        }

        if let Some(status) = self.document_status() {
            if status >= 400 {
                return Err(WatchError::Http(status));
            }
        }

        Ok(())
    }

    async fn goto_and_wait_for_dom(&self, page: &Page) -> Result<()> {
        match page.goto(self.url.as_str()).await {
            Ok(_) => {}
            // The protocol client has its own request timeout; treat it the
            // same as our outer page-load timeout
            Err(CdpError::Timeout) => {
                println!("⏳ Navigation timed out, continuing with partial state");
                return Ok(());
            }
            Err(e) => return Err(WatchError::navigation(e.to_string())),
        }

        // DOM parsed means readyState has left "loading"; full resource load
        // is not awaited
        loop {
            let state = page
                .evaluate("document.readyState")
                .await
                .ok()
                .and_then(|result| result.value().and_then(|v| v.as_str().map(str::to_string)));

            if matches!(state.as_deref(), Some("interactive") | Some("complete")) {
                return Ok(());
            }

            sleep(Duration::from_millis(100)).await;
        }
    }

    /// Take the visit screenshot. Failures are logged and leave the visit
    /// classification untouched.
    async fn capture(&self) -> Option<PathBuf> {
        let page = match self.page().await {
            Ok(page) => page,
            Err(_) => return None,
        };

        let filename = screenshot_filename(&self.config.capture.prefix, Utc::now(), &self.profile.name);
        let path = Path::new(&self.config.capture.dir).join(filename);

        match self.write_screenshot(&page, &path).await {
            Ok(()) => {
                println!("📸 Screenshot saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                eprintln!("⚠️  Screenshot failed: {e}");
                None
            }
        }
    }

    /// Read the page title and the (possibly redirected) final URL. Log only.
    async fn collect_info(&self) {
        let Ok(page) = self.page().await else {
            return;
        };

        let title = page
            .get_title()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| "<untitled>".to_string());
        let current_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| self.url.clone());

        println!("📄 Title: \"{}\" ({})", title, current_url);
    }

    /// Best-effort screenshot on the error path, written to a fixed
    /// per-profile filename so repeated errors overwrite it.
    async fn capture_error_screenshot(&self) {
        let page = match self.page().await {
            Ok(page) => page,
            Err(_) => return,
        };

        let filename = error_screenshot_filename(
            &self.config.capture.error_prefix,
            &self.config.capture.prefix,
            &self.profile.name,
        );
        let path = Path::new(&self.config.capture.dir).join(filename);

        match self.write_screenshot(&page, &path).await {
            Ok(()) => println!("📸 Error screenshot saved to {}", path.display()),
            Err(e) => eprintln!("⚠️  Could not capture error screenshot: {e}"),
        }
    }

    async fn write_screenshot(&self, page: &Page, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let bytes = page
            .screenshot(params)
            .await
            .map_err(|e| WatchError::screenshot(e.to_string()))?;

        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| WatchError::screenshot(e.to_string()))?;
        Ok(())
    }

    async fn page(&self) -> Result<Page> {
        let guard = self.resources.lock().await;
        guard
            .as_ref()
            .map(|resources| resources.page.clone())
            .ok_or(WatchError::AlreadyClosed)
    }

    fn recorded_http_status(&self) -> i64 {
        self.telemetry
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.http_status()))
            .unwrap_or(0)
    }

    fn document_status(&self) -> Option<i64> {
        self.telemetry
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|t| t.document_status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceCatalog;

    fn test_session() -> VisitSession {
        let profile = DeviceCatalog::standard().profile_for(0).clone();
        VisitSession::new("https://example.com", profile, Config::default())
    }

    #[tokio::test]
    async fn test_cleanup_before_launch_is_a_noop() {
        let session = test_session();
        // Nothing launched yet; both calls must be silent no-ops
        session.cleanup().await;
        session.cleanup().await;
    }

    #[tokio::test]
    async fn test_page_after_cleanup_reports_closed() {
        let session = test_session();
        session.cleanup().await;
        assert!(matches!(
            session.page().await,
            Err(WatchError::AlreadyClosed)
        ));
    }

    #[test]
    fn test_http_status_defaults_to_zero() {
        let session = test_session();
        assert_eq!(session.recorded_http_status(), 0);
        assert_eq!(session.document_status(), None);
    }
}
