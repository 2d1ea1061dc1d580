//! shutguard-agent: Decides, once per invocation, whether to power the host off.
//!
//! Checks the maintenance window, probes established connections for
//! critical ports with a fail-closed policy, and only then runs the
//! power-off command. Every step is recorded in an explicit journal.

pub mod config;
pub mod error;
pub mod guard;
pub mod power;
pub mod probe;
