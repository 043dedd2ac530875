//! Visit flow integration tests
//!
//! Runs full visits against a local HTTP server. These need a Chrome/Chromium
//! install, so they are ignored by default.

use std::path::Path;
use std::time::Duration;

use sitewatch::core::{Config, VisitStatus};
use sitewatch::devices::DeviceCatalog;
use sitewatch::session::VisitSession;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve every connection a fixed HTTP response.
async fn spawn_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n{body}",
                    status = status_line,
                    len = body.len(),
                    body = body,
                );
                let _ = stream.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{addr}")
}

/// Accept connections but never answer, to force a navigation timeout.
async fn spawn_stalling_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                tokio::time::sleep(Duration::from_secs(3600)).await;
            });
        }
    });

    format!("http://{addr}")
}

/// Config tuned so the tests don't sit through production delays.
fn fast_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.browser.settle_secs = 1;
    config.browser.page_load_timeout_secs = 10;
    config.capture.dir = dir.to_string_lossy().into_owned();
    config
}

fn first_profile() -> sitewatch::DeviceProfile {
    DeviceCatalog::standard().profile_for(0).clone()
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_successful_visit_writes_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let url = spawn_server(
        "200 OK",
        "<html><head><title>up</title></head><body>hello</body></html>",
    )
    .await;

    let session = VisitSession::new(url, first_profile(), fast_config(dir.path()));
    let result = session.run().await;

    assert_eq!(result.status, VisitStatus::Success);
    assert_eq!(result.http_status, 0);
    assert!(result.screenshot_taken);
    assert!(result.screenshot_path.unwrap().exists());
}

#[tokio::test]
#[ignore]
async fn test_http_404_classifies_as_error_with_status() {
    let dir = tempfile::tempdir().unwrap();
    let url = spawn_server("404 Not Found", "<html><body>gone</body></html>").await;

    let profile = first_profile();
    let session = VisitSession::new(url, profile.clone(), fast_config(dir.path()));
    let result = session.run().await;

    assert_eq!(result.status, VisitStatus::Error);
    assert_eq!(result.http_status, 404);
    assert!(result.error.unwrap().contains("404"));

    // The error screenshot attempt lands on the fixed per-profile filename
    let slug = sitewatch::session::naming::slugify(&profile.name);
    let error_shot = dir.path().join(format!("error-screenshot-{slug}.png"));
    assert!(error_shot.exists());
}

#[tokio::test]
#[ignore]
async fn test_navigation_timeout_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let url = spawn_stalling_server().await;

    let mut config = fast_config(dir.path());
    config.browser.page_load_timeout_secs = 5;

    let session = VisitSession::new(url, first_profile(), config);
    let result = session.run().await;

    // The timeout is swallowed; the visit proceeds to capture and succeeds
    assert_eq!(result.status, VisitStatus::Success);
}

#[tokio::test]
#[ignore]
async fn test_cleanup_after_run_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let url = spawn_server("200 OK", "<html><body>ok</body></html>").await;

    let session = VisitSession::new(url, first_profile(), fast_config(dir.path()));
    let result = session.run().await;
    assert_eq!(result.status, VisitStatus::Success);

    // run() already cleaned up; further calls must be silent no-ops
    session.cleanup().await;
    session.cleanup().await;
}
