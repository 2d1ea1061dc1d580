//! CLI entry point for the shutguard shutdown guard.
//!
//! Meant to be started by an external timer (cron, systemd) every few
//! minutes. Each run takes exactly one decision and exits with status 0,
//! whatever that decision was.

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use shutguard_agent::config;
use shutguard_agent::guard::{run_once, warn_degenerate_window, RunReport};
use shutguard_agent::power::{DryRunPower, SystemPower};
use shutguard_agent::probe::SsProbe;
use shutguard_journal::{FileSink, Journal};

#[derive(Parser)]
#[command(name = "shutguard")]
#[command(about = "Power the host off inside its maintenance window unless critical connections are open")]
struct Cli {
    /// Config file prefix (default: shutguard).
    #[arg(short, long, default_value = "shutguard")]
    config: String,

    /// Evaluate every gate but never run the power command.
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Override the journal file path.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let mut guard_config = config::load(&cli.config)?;
    if let Some(path) = cli.log_file {
        guard_config.log_file = path;
    }

    let mut journal = Journal::new();
    journal.attach(FileSink::open(&guard_config.log_file)?);

    warn_degenerate_window(&guard_config.window, &mut journal);

    let now = Local::now().naive_local();
    let probe = SsProbe::from_config(&guard_config.probe);

    let outcome = if cli.dry_run {
        let power = DryRunPower::from_config(&guard_config.power);
        run_once(
            now,
            &guard_config.window,
            &guard_config.critical_ports,
            &probe,
            &power,
            &mut journal,
        )
        .await
    } else {
        let power = SystemPower::from_config(&guard_config.power);
        run_once(
            now,
            &guard_config.window,
            &guard_config.critical_ports,
            &probe,
            &power,
            &mut journal,
        )
        .await
    };

    let report = RunReport::new(now, guard_config.window, outcome, journal.finalize());
    tracing::debug!(run_id = %report.run_id, outcome = ?report.outcome, "Run complete");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
