//! shutguard-core: Domain types and policy evaluation for the shutguard host shutdown guard.
//!
//! This crate holds everything that can be decided without touching the
//! operating system:
//! - Time-of-day and maintenance window types, and the window gate
//! - The critical port set and the substring matcher over probe output
//! - The explicit probe outcome (clear / active / failed) with its fail-closed mapping
//! - Layered configuration loading
//! - The core error type

pub mod activity;
pub mod config;
pub mod error;
pub mod types;
pub mod window;

pub use activity::{PortMatch, ProbeFailure, ProbeOutcome};
pub use error::CoreError;
pub use types::{CriticalPorts, MaintenanceWindow, TimeOfDay};
pub use window::{in_window, in_window_hm};
