//! Critical activity evaluation over connection-status output.
//!
//! The probe itself (spawning the status tool) lives in the agent crate.
//! This module only turns what the probe produced into an explicit
//! [`ProbeOutcome`], and owns the fail-closed rule: a probe that could not
//! complete counts as busy.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::CriticalPorts;

/// A critical marker found in one line of probe output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMatch {
    /// The configured marker that hit, e.g. `":22"`.
    pub marker: String,
    /// The full output line containing the marker.
    pub line: String,
}

/// Why a connection probe could not produce an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    #[error("status command timed out after {after:?}")]
    TimedOut { after: Duration },

    #[error("failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// `status` is the rendered exit status, e.g. `exit status: 1` or `signal: 9 (SIGKILL)`.
    #[error("status command returned non-zero {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },

    #[error("status output is not valid UTF-8: {reason}")]
    Decode { reason: String },
}

/// Result of one critical-activity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The probe completed and no line contained a critical marker.
    Clear,
    /// The probe completed and found a critical connection.
    Active(PortMatch),
    /// The probe did not complete; the real network state is unknown.
    Failed(ProbeFailure),
}

impl ProbeOutcome {
    /// Classify raw probe output against the critical port set.
    pub fn from_output(ports: &CriticalPorts, output: &str) -> Self {
        match ports.first_match(output) {
            Some(hit) => Self::Active(hit),
            None => Self::Clear,
        }
    }

    /// Classify a probe result, keeping failures explicit.
    pub fn from_probe(
        ports: &CriticalPorts,
        result: std::result::Result<String, ProbeFailure>,
    ) -> Self {
        match result {
            Ok(output) => Self::from_output(ports, &output),
            Err(failure) => Self::Failed(failure),
        }
    }

    /// Whether a shutdown must be held back.
    ///
    /// `Failed` is busy: when the check cannot be completed, activity is assumed.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Clear => false,
            Self::Active(_) | Self::Failed(_) => true,
        }
    }
}
