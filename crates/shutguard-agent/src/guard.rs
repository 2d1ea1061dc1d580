//! One guard run: window gate → activity gate → power-off.

use chrono::NaiveDateTime;
use serde::Serialize;

use shutguard_core::{CriticalPorts, MaintenanceWindow, ProbeOutcome};
use shutguard_journal::{Journal, JournalRecord, RunId};

use crate::power::{self, PowerControl};
use crate::probe::{self, ConnectionProbe};

/// How a run ended. Every variant exits the process with status 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// `now` was outside the maintenance window; nothing was probed.
    OutsideWindow,
    /// A critical connection was open.
    AbortedActive { marker: String },
    /// The probe failed, so activity was assumed.
    AbortedProbeFailed { reason: String },
    /// The power command ran and exited successfully.
    ShutdownIssued,
    /// The power command could not be run or exited non-zero.
    ShutdownFailed { reason: String },
    /// Every gate passed but `--dry-run` kept the power command from running.
    DryRun,
}

/// Journal a WARNING when `window` starts after it ends and can never open.
///
/// Returns whether the warning was written.
pub fn warn_degenerate_window(window: &MaintenanceWindow, journal: &mut Journal) -> bool {
    if !window.is_degenerate() {
        return false;
    }
    journal.warn(format!(
        "Shutdown window {window} starts after it ends and will never open."
    ));
    true
}

/// Decide and act once for the instant `now`.
///
/// `now` is captured by the caller a single time; nothing is re-checked
/// after a decision is taken.
pub async fn run_once<P, C>(
    now: NaiveDateTime,
    window: &MaintenanceWindow,
    ports: &CriticalPorts,
    probe: &P,
    power: &C,
    journal: &mut Journal,
) -> Outcome
where
    P: ConnectionProbe,
    C: PowerControl,
{
    if !window.contains(&now) {
        tracing::debug!(now = %now, window = %window, "Outside maintenance window");
        journal.info("Outside shutdown window. Skipping execution.");
        return Outcome::OutsideWindow;
    }

    // Fail-closed: a probe that could not finish blocks the shutdown just
    // like an open critical connection.
    let outcome = match probe::check_activity(probe, ports, journal).await {
        ProbeOutcome::Clear => None,
        ProbeOutcome::Active(hit) => Some(Outcome::AbortedActive { marker: hit.marker }),
        ProbeOutcome::Failed(failure) => Some(Outcome::AbortedProbeFailed {
            reason: failure.to_string(),
        }),
    };

    if let Some(aborted) = outcome {
        journal.info("Shutdown aborted due to active network usage.");
        return aborted;
    }

    power::shutdown_system(power, journal).await
}

/// Summary of a finished run, printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    /// The instant the decision was made for (local time).
    pub now: NaiveDateTime,
    pub window: MaintenanceWindow,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub journal: JournalRecord,
}

impl RunReport {
    pub fn new(
        now: NaiveDateTime,
        window: MaintenanceWindow,
        outcome: Outcome,
        journal: JournalRecord,
    ) -> Self {
        Self {
            run_id: journal.run_id,
            now,
            window,
            outcome,
            journal,
        }
    }
}
