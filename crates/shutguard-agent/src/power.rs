//! Power-off executor.

use std::future::Future;

use tokio::process::Command;

use shutguard_journal::Journal;

use crate::config::PowerConfig;
use crate::error::PowerError;
use crate::guard::Outcome;

/// Something that can turn the host off.
pub trait PowerControl: Send + Sync {
    /// Issue the power-off and wait for the command to finish.
    fn power_off(&self) -> impl Future<Output = Result<(), PowerError>> + Send;

    /// True when `power_off` does not actually touch the machine.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs the configured power command (`systemctl poweroff` by default).
pub struct SystemPower {
    program: String,
    args: Vec<String>,
}

impl SystemPower {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }

    pub fn from_config(config: &PowerConfig) -> Self {
        Self::new(&config.program, &config.args)
    }
}

impl PowerControl for SystemPower {
    async fn power_off(&self) -> Result<(), PowerError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .await
            .map_err(|source| PowerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(PowerError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// Stands in for [`SystemPower`] under `--dry-run`; never spawns anything.
pub struct DryRunPower {
    command: String,
}

impl DryRunPower {
    pub fn from_config(config: &PowerConfig) -> Self {
        let mut command = config.program.clone();
        for arg in &config.args {
            command.push(' ');
            command.push_str(arg);
        }
        Self { command }
    }
}

impl PowerControl for DryRunPower {
    async fn power_off(&self) -> Result<(), PowerError> {
        tracing::info!(command = %self.command, "Dry run, power command not executed");
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Single power-off attempt. Failures are journaled and swallowed; no retry.
pub async fn shutdown_system<C: PowerControl>(power: &C, journal: &mut Journal) -> Outcome {
    if power.is_dry_run() {
        journal.info("Conditions met. Dry run: shutdown not initiated.");
    } else {
        journal.info("Conditions met. Initiating system shutdown.");
    }

    match power.power_off().await {
        Ok(()) if power.is_dry_run() => Outcome::DryRun,
        Ok(()) => Outcome::ShutdownIssued,
        Err(e) => {
            journal.error(format!("Shutdown failed: {e}"));
            Outcome::ShutdownFailed {
                reason: e.to_string(),
            }
        }
    }
}
