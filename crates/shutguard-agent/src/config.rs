//! Configuration for the shutguard agent.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use shutguard_core::config::ConfigLayers;
use shutguard_core::{CriticalPorts, MaintenanceWindow};

use crate::error::{AgentError, Result};

/// Environment variable prefix: `SHUTGUARD__GUARD__LOG_FILE=...`.
pub const ENV_PREFIX: &str = "SHUTGUARD";

/// Top-level guard configuration.
///
/// Loaded from the `[guard]` section of `shutguard.toml` (or the file named by
/// `--config`) and `SHUTGUARD__GUARD__` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Markers that block the shutdown when found in an established-connection line.
    #[serde(default)]
    pub critical_ports: CriticalPorts,

    /// Daily window in which a shutdown may happen.
    #[serde(default)]
    pub window: MaintenanceWindow,

    /// Journal file; entries are appended, never rotated.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub power: PowerConfig,
}

/// The established-connection status command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_program")]
    pub program: String,

    #[serde(default = "default_probe_args")]
    pub args: Vec<String>,

    /// Upper bound on the status command's run time.
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

/// The power-off command. Runs without a time limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConfig {
    #[serde(default = "default_power_program")]
    pub program: String,

    #[serde(default = "default_power_args")]
    pub args: Vec<String>,
}

impl GuardConfig {
    /// Reject values that would make the guard misbehave rather than merely skip.
    pub fn validate(&self) -> Result<()> {
        self.critical_ports.validate()?;

        if self.probe.timeout_secs == 0 {
            return Err(AgentError::Config(
                "probe.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.probe.program.is_empty() {
            return Err(AgentError::Config("probe.program is empty".to_string()));
        }
        if self.power.program.is_empty() {
            return Err(AgentError::Config("power.program is empty".to_string()));
        }

        Ok(())
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load and validate the `[guard]` section.
///
/// `file_prefix` is the config file path without extension; the file is optional.
pub fn load(file_prefix: &str) -> Result<GuardConfig> {
    let config: GuardConfig = ConfigLayers::new(file_prefix, ENV_PREFIX)
        .with_list_key("guard.critical_ports")
        .with_list_key("guard.probe.args")
        .with_list_key("guard.power.args")
        .load_section("guard")?;
    config.validate()?;
    Ok(config)
}

fn default_log_file() -> PathBuf {
    PathBuf::from("/var/log/auto_shutdown.log")
}

fn default_probe_program() -> String {
    "/usr/sbin/ss".to_string()
}

fn default_probe_args() -> Vec<String> {
    vec![
        "-tn".to_string(),
        "state".to_string(),
        "established".to_string(),
    ]
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_power_program() -> String {
    "/bin/systemctl".to_string()
}

fn default_power_args() -> Vec<String> {
    vec!["poweroff".to_string()]
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            critical_ports: CriticalPorts::default(),
            window: MaintenanceWindow::default(),
            log_file: default_log_file(),
            probe: ProbeConfig::default(),
            power: PowerConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: default_probe_program(),
            args: default_probe_args(),
            timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            program: default_power_program(),
            args: default_power_args(),
        }
    }
}
