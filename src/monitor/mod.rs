//! Monitor module - the rotation loop
//!
//! Repeatedly selects the next device profile round-robin, runs one visit,
//! folds the outcome into the run counters, prints the running tally and
//! sleeps an interruptible inter-visit interval.

pub mod shutdown;

use std::sync::Arc;

use chrono::Utc;

use crate::core::{Config, Result, VisitResult, VisitStatus};
use crate::devices::DeviceCatalog;
use crate::session::VisitSession;

pub use shutdown::Shutdown;

/// Process-wide visit counters, mutated only by the rotation loop.
#[derive(Debug, Clone, Default)]
pub struct RunCounters {
    /// Zero-based index of the next visit
    pub iteration: u64,
    /// Visits that finished without an aborting error
    pub success_count: u64,
    /// Visits aborted by launch, HTTP or navigation failure
    pub error_count: u64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a visit outcome into the counters
    pub fn record(&mut self, result: &VisitResult) {
        match result.status {
            VisitStatus::Success => self.success_count += 1,
            VisitStatus::Error => self.error_count += 1,
        }
    }

    /// Move on to the next iteration
    pub fn advance(&mut self) {
        self.iteration += 1;
    }

    /// Total visits folded in so far
    pub fn completed(&self) -> u64 {
        self.success_count + self.error_count
    }

    /// Percentage of successful visits, 0.0 before the first visit
    pub fn success_rate(&self) -> f64 {
        if self.completed() == 0 {
            return 0.0;
        }
        self.success_count as f64 * 100.0 / self.completed() as f64
    }
}

/// The rotation loop: drives visits until shutdown or the iteration cap.
pub struct Monitor {
    url: String,
    config: Config,
    catalog: DeviceCatalog,
    shutdown: Shutdown,
    counters: RunCounters,
}

impl Monitor {
    /// Create a monitor for the given (already validated) URL
    pub fn new(url: impl Into<String>, config: Config) -> Self {
        Self {
            url: url.into(),
            config,
            catalog: DeviceCatalog::standard(),
            shutdown: Shutdown::new(),
            counters: RunCounters::new(),
        }
    }

    /// Counters so far (final tally after `run` returns)
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Run visits until a shutdown signal arrives or the iteration cap is
    /// reached. Per-visit failures never abort the loop.
    pub async fn run(&mut self) -> Result<()> {
        self.shutdown.listen(self.config.rotation.shutdown_grace());
        self.print_header();

        let max_iterations = self.config.rotation.max_iterations;

        while !self.shutdown.is_shutting_down() && self.counters.iteration < max_iterations {
            let profile = self.catalog.profile_for(self.counters.iteration).clone();
            println!(
                "\n[#{}] {} — {} ({})",
                self.counters.iteration,
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                profile.name,
                profile.category
            );

            let session = Arc::new(VisitSession::new(
                self.url.clone(),
                profile,
                self.config.clone(),
            ));
            self.shutdown.set_current(session.clone()).await;
            let result = session.run().await;
            self.shutdown.clear_current().await;

            self.counters.record(&result);
            self.print_visit_summary(&result);
            self.counters.advance();

            if self.shutdown.is_shutting_down() || self.counters.iteration >= max_iterations {
                break;
            }

            println!(
                "⏸  Next visit in {}s",
                self.config.rotation.interval_secs
            );
            self.shutdown
                .wait_interruptible(
                    self.config.rotation.interval(),
                    self.config.rotation.poll_interval(),
                )
                .await;
        }

        self.print_final_tally();
        Ok(())
    }

    fn print_header(&self) {
        println!("🔭 sitewatch starting");
        println!("   Target:    {}", self.url);
        println!("   Devices:   {} profiles in rotation", self.catalog.len());
        println!(
            "   Interval:  {}s between visits",
            self.config.rotation.interval_secs
        );
        println!(
            "   Cap:       {} iterations",
            self.config.rotation.max_iterations
        );
    }

    fn print_visit_summary(&self, result: &VisitResult) {
        let rate = self.counters.success_rate();
        let completed = self.counters.completed();

        match result.status {
            VisitStatus::Success => {
                if result.http_status > 0 {
                    println!(
                        "✅ Visit succeeded (saw HTTP {}) — success rate {:.1}% ({}/{})",
                        result.http_status, rate, self.counters.success_count, completed
                    );
                } else {
                    println!(
                        "✅ Visit succeeded — success rate {:.1}% ({}/{})",
                        rate, self.counters.success_count, completed
                    );
                }
            }
            VisitStatus::Error => {
                println!(
                    "❌ Visit failed ({}) — success rate {:.1}% ({}/{})",
                    result.error.as_deref().unwrap_or("unknown error"),
                    rate,
                    self.counters.success_count,
                    completed
                );
            }
        }
    }

    fn print_final_tally(&self) {
        println!(
            "\n🏁 Run complete: {} visits, {} succeeded, {} failed ({:.1}%)",
            self.counters.completed(),
            self.counters.success_count,
            self.counters.error_count,
            self.counters.success_rate()
        );
    }
}
