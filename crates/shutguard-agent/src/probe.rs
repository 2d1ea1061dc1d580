//! Established-connection probe.
//!
//! Runs the connection-status tool (`ss -tn state established` by default)
//! under `tokio::process::Command` with a hard timeout, and classifies its
//! output against the critical port set.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use shutguard_core::{CriticalPorts, ProbeFailure, ProbeOutcome};
use shutguard_journal::Journal;

use crate::config::ProbeConfig;

/// Source of established-connection listings.
pub trait ConnectionProbe: Send + Sync {
    /// Return the raw text listing of established connections.
    fn established(&self) -> impl Future<Output = Result<String, ProbeFailure>> + Send;
}

/// Wrapper around the connection-status binary.
pub struct SsProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SsProbe {
    pub fn new(program: &str, args: &[String], timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            timeout,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(&config.program, &config.args, config.timeout())
    }
}

impl ConnectionProbe for SsProbe {
    /// Run the status command and return its stdout.
    ///
    /// The child is killed if it outlives the timeout. A non-zero exit or
    /// output that is not UTF-8 is a failure, not an empty listing.
    async fn established(&self) -> Result<String, ProbeFailure> {
        let run = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ProbeFailure::Spawn {
                    program: self.program.clone(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ProbeFailure::TimedOut {
                    after: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(ProbeFailure::NonZeroExit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| ProbeFailure::Decode {
            reason: e.to_string(),
        })
    }
}

/// Probe once and journal the result.
///
/// Writes exactly one entry: INFO for a completed check, ERROR for a failed one.
pub async fn check_activity<P: ConnectionProbe>(
    probe: &P,
    ports: &CriticalPorts,
    journal: &mut Journal,
) -> ProbeOutcome {
    let outcome = ProbeOutcome::from_probe(ports, probe.established().await);

    match &outcome {
        ProbeOutcome::Active(hit) => {
            tracing::debug!(marker = %hit.marker, line = %hit.line, "Critical connection");
            journal.info(format!(
                "Active network connection detected on critical port {}.",
                hit.marker
            ));
        }
        ProbeOutcome::Clear => {
            journal.info("No active connections on critical ports.");
        }
        ProbeOutcome::Failed(ProbeFailure::TimedOut { after }) => {
            journal.error(format!("Connection probe exceeded timeout of {after:?}."));
        }
        ProbeOutcome::Failed(failure) => {
            journal.error(format!("Network activity check failed: {failure}"));
        }
    }

    outcome
}

/// True when a shutdown must be held back: activity was seen or the probe failed.
pub async fn has_critical_activity<P: ConnectionProbe>(
    probe: &P,
    ports: &CriticalPorts,
    journal: &mut Journal,
) -> bool {
    check_activity(probe, ports, journal).await.is_busy()
}
