//! Passive page observers
//!
//! Before navigation the session attaches three observers to the page: HTTP
//! responses, console messages and uncaught page exceptions. Observers never
//! alter control flow; they log and annotate the visit's telemetry.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chromiumoxide::cdp::browser_protocol::network::{
    self, EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::core::Result;

/// Shared, lock-free record of what the observers saw.
///
/// Cheaply cloneable; the CDP event tasks write, the session reads.
#[derive(Debug, Clone)]
pub struct PageTelemetry {
    inner: Arc<TelemetryInner>,
}

#[derive(Debug)]
struct TelemetryInner {
    /// Latest response status >= 400 seen on any request (0 = none)
    error_status: AtomicI64,
    /// Status of the first main-document response (0 = not seen yet)
    document_status: AtomicI64,
}

impl PageTelemetry {
    fn new() -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                error_status: AtomicI64::new(0),
                document_status: AtomicI64::new(0),
            }),
        }
    }

    /// Worst-case HTTP status for the visit: 0 when no error status was seen
    pub fn http_status(&self) -> i64 {
        self.inner.error_status.load(Ordering::SeqCst)
    }

    /// Status of the main document response, if one arrived
    pub fn document_status(&self) -> Option<i64> {
        match self.inner.document_status.load(Ordering::SeqCst) {
            0 => None,
            status => Some(status),
        }
    }

    fn record_error_status(&self, status: i64) {
        self.inner.error_status.store(status, Ordering::SeqCst);
    }

    fn record_document_status(&self, status: i64) {
        // First document response wins; later navigations within the visit
        // (client-side redirects re-requesting the document) don't overwrite it
        let _ = self.inner.document_status.compare_exchange(
            0,
            status,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

/// The three observer tasks plus their shared telemetry.
pub struct Observers {
    telemetry: PageTelemetry,
    tasks: Vec<JoinHandle<()>>,
}

impl Observers {
    /// Attach response, console and exception observers to the page.
    ///
    /// Must be called before navigation so the main document response is seen.
    pub async fn attach(page: &Page) -> Result<Self> {
        // Response events only flow once the Network domain is enabled
        page.execute(network::EnableParams::default()).await?;

        let telemetry = PageTelemetry::new();
        let mut tasks = Vec::with_capacity(3);

        let mut responses = page.event_listener::<EventResponseReceived>().await?;
        let response_telemetry = telemetry.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                observe_response(&event, &response_telemetry);
            }
        }));

        let mut console = page.event_listener::<EventConsoleApiCalled>().await?;
        tasks.push(tokio::spawn(async move {
            while let Some(event) = console.next().await {
                if matches!(event.r#type, ConsoleApiCalledType::Error) {
                    println!("⚠️  Console error: {}", format_console_args(&event));
                }
            }
        }));

        let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
        tasks.push(tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                println!("⚠️  Page error: {}", format_exception(&event));
            }
        }));

        Ok(Self { telemetry, tasks })
    }

    /// Handle to the shared telemetry
    pub fn telemetry(&self) -> PageTelemetry {
        self.telemetry.clone()
    }

    /// Stop the observer tasks. Safe to call more than once.
    pub fn detach(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn observe_response(event: &EventResponseReceived, telemetry: &PageTelemetry) {
    let status = event.response.status;

    if matches!(event.r#type, ResourceType::Document) {
        telemetry.record_document_status(status);
    }

    if status >= 400 {
        println!("⚠️  HTTP {} for {}", status, event.response.url);
        telemetry.record_error_status(status);
    }
}

fn format_console_args(event: &EventConsoleApiCalled) -> String {
    if event.args.is_empty() {
        return "<no message>".to_string();
    }

    event
        .args
        .iter()
        .map(|arg| {
            if let Some(text) = arg.value.as_ref().and_then(|v| v.as_str()) {
                text.to_string()
            } else if let Some(description) = arg.description.as_deref() {
                description.to_string()
            } else {
                "<object>".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_exception(event: &EventExceptionThrown) -> String {
    let details = &event.exception_details;

    details
        .exception
        .as_ref()
        .and_then(|exception| exception.description.clone())
        .unwrap_or_else(|| details.text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_defaults_to_no_status() {
        let telemetry = PageTelemetry::new();
        assert_eq!(telemetry.http_status(), 0);
        assert_eq!(telemetry.document_status(), None);
    }

    #[test]
    fn test_error_status_keeps_latest() {
        let telemetry = PageTelemetry::new();
        telemetry.record_error_status(404);
        telemetry.record_error_status(500);
        assert_eq!(telemetry.http_status(), 500);
    }

    #[test]
    fn test_document_status_keeps_first() {
        let telemetry = PageTelemetry::new();
        telemetry.record_document_status(404);
        telemetry.record_document_status(200);
        assert_eq!(telemetry.document_status(), Some(404));
    }
}
