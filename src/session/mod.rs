//! Session module - one browser visit from launch to cleanup
//!
//! Contains the single-visit state machine, the passive page observers and
//! screenshot naming.

pub mod naming;
pub mod observers;
pub mod visit;

pub use observers::PageTelemetry;
pub use visit::VisitSession;
