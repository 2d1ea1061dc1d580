//! End-to-end decision scenarios with in-process probe and power doubles.
//!
//! No real status tool or power command is involved; the doubles count
//! their calls so each test can assert which gates were reached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use shutguard_agent::error::PowerError;
use shutguard_agent::guard::{run_once, Outcome};
use shutguard_agent::power::PowerControl;
use shutguard_agent::probe::ConnectionProbe;
use shutguard_core::{CriticalPorts, MaintenanceWindow, ProbeFailure, TimeOfDay};
use shutguard_journal::{FileSink, Journal, Severity};

struct ScriptedProbe {
    response: Result<String, ProbeFailure>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    fn output(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(failure: ProbeFailure) -> Self {
        Self {
            response: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConnectionProbe for ScriptedProbe {
    async fn established(&self) -> Result<String, ProbeFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

#[derive(Default)]
struct RecordingPower {
    fail: bool,
    calls: AtomicUsize,
}

impl RecordingPower {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PowerControl for RecordingPower {
    async fn power_off(&self) -> Result<(), PowerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PowerError::Failed {
                program: "/bin/systemctl".to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

const QUIET_OUTPUT: &str = "\
Recv-Q Send-Q Local Address:Port Peer Address:Port Process
0      0      192.168.1.20:443   93.184.216.34:51000
0      0      192.168.1.20:8080  192.168.1.30:41234";

const SSH_OUTPUT: &str = "\
Recv-Q Send-Q Local Address:Port Peer Address:Port Process
0      0      192.168.1.20:22    192.168.1.77:60412";

fn window() -> MaintenanceWindow {
    MaintenanceWindow::new(TimeOfDay::new(2, 15).unwrap(), TimeOfDay::new(4, 0).unwrap())
}

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 3)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn messages(journal: &Journal) -> Vec<String> {
    journal.entries().iter().map(|e| e.message.clone()).collect()
}

#[tokio::test]
async fn shutdown_at_window_start_with_quiet_network() {
    let probe = ScriptedProbe::output(QUIET_OUTPUT);
    let power = RecordingPower::default();
    let mut journal = Journal::new();

    let outcome = run_once(
        at(2, 15, 0),
        &window(),
        &CriticalPorts::default(),
        &probe,
        &power,
        &mut journal,
    )
    .await;

    assert_eq!(outcome, Outcome::ShutdownIssued);
    assert_eq!(probe.calls(), 1);
    assert_eq!(power.calls(), 1);
    assert_eq!(
        messages(&journal),
        [
            "No active connections on critical ports.",
            "Conditions met. Initiating system shutdown.",
        ]
    );
}

#[tokio::test]
async fn outside_window_touches_nothing() {
    let probe = ScriptedProbe::output(QUIET_OUTPUT);
    let power = RecordingPower::default();

    for now in [at(2, 14, 59), at(4, 0, 1), at(12, 0, 0)] {
        let mut journal = Journal::new();
        let outcome = run_once(
            now,
            &window(),
            &CriticalPorts::default(),
            &probe,
            &power,
            &mut journal,
        )
        .await;

        assert_eq!(outcome, Outcome::OutsideWindow);
        assert_eq!(
            messages(&journal),
            ["Outside shutdown window. Skipping execution."]
        );
    }

    assert_eq!(probe.calls(), 0);
    assert_eq!(power.calls(), 0);
}

#[tokio::test]
async fn ssh_session_blocks_shutdown() {
    let probe = ScriptedProbe::output(SSH_OUTPUT);
    let power = RecordingPower::default();
    let mut journal = Journal::new();

    let outcome = run_once(
        at(3, 0, 0),
        &window(),
        &CriticalPorts::default(),
        &probe,
        &power,
        &mut journal,
    )
    .await;

    assert_eq!(
        outcome,
        Outcome::AbortedActive {
            marker: ":22".to_string()
        }
    );
    assert_eq!(power.calls(), 0);
    assert_eq!(
        messages(&journal).last().unwrap(),
        "Shutdown aborted due to active network usage."
    );
}

#[tokio::test]
async fn probe_timeout_fails_closed() {
    let probe = ScriptedProbe::failing(ProbeFailure::TimedOut {
        after: Duration::from_secs(5),
    });
    let power = RecordingPower::default();
    let mut journal = Journal::new();

    let outcome = run_once(
        at(3, 0, 0),
        &window(),
        &CriticalPorts::default(),
        &probe,
        &power,
        &mut journal,
    )
    .await;

    assert!(matches!(outcome, Outcome::AbortedProbeFailed { .. }));
    assert_eq!(power.calls(), 0);

    let record = journal.finalize();
    assert_eq!(record.count(Severity::Error), 1);
    assert_eq!(
        record.entries[0].message,
        "Connection probe exceeded timeout of 5s."
    );
}

#[tokio::test]
async fn any_probe_failure_fails_closed() {
    let failures = [
        ProbeFailure::Spawn {
            program: "/usr/sbin/ss".to_string(),
            reason: "No such file or directory (os error 2)".to_string(),
        },
        ProbeFailure::NonZeroExit {
            status: "exit status: 1".to_string(),
            stderr: String::new(),
        },
        ProbeFailure::Decode {
            reason: "invalid utf-8 sequence of 1 bytes from index 0".to_string(),
        },
    ];

    for failure in failures {
        let probe = ScriptedProbe::failing(failure);
        let power = RecordingPower::default();
        let mut journal = Journal::new();

        let outcome = run_once(
            at(3, 30, 0),
            &window(),
            &CriticalPorts::default(),
            &probe,
            &power,
            &mut journal,
        )
        .await;

        assert!(matches!(outcome, Outcome::AbortedProbeFailed { .. }));
        assert_eq!(power.calls(), 0);
        assert!(messages(&journal)[0].starts_with("Network activity check failed:"));
    }
}

#[tokio::test]
async fn substring_match_blocks_on_lookalike_port() {
    // :2200 is not ssh, but the ":22" marker still matches it.
    let probe = ScriptedProbe::output("0 0 192.168.1.20:2200 192.168.1.77:60412");
    let power = RecordingPower::default();
    let mut journal = Journal::new();

    let outcome = run_once(
        at(3, 0, 0),
        &window(),
        &CriticalPorts::default(),
        &probe,
        &power,
        &mut journal,
    )
    .await;

    assert!(matches!(outcome, Outcome::AbortedActive { .. }));
    assert_eq!(power.calls(), 0);
}

#[tokio::test]
async fn inverted_window_never_shuts_down() {
    let inverted =
        MaintenanceWindow::new(TimeOfDay::new(23, 0).unwrap(), TimeOfDay::new(1, 0).unwrap());
    let probe = ScriptedProbe::output(QUIET_OUTPUT);
    let power = RecordingPower::default();

    for now in [at(23, 30, 0), at(0, 30, 0), at(0, 0, 0)] {
        let mut journal = Journal::new();
        let outcome = run_once(
            now,
            &inverted,
            &CriticalPorts::default(),
            &probe,
            &power,
            &mut journal,
        )
        .await;
        assert_eq!(outcome, Outcome::OutsideWindow);
    }

    assert_eq!(probe.calls(), 0);
    assert_eq!(power.calls(), 0);
}

#[tokio::test]
async fn power_failure_is_journaled_and_swallowed() {
    let probe = ScriptedProbe::output(QUIET_OUTPUT);
    let power = RecordingPower {
        fail: true,
        ..Default::default()
    };
    let mut journal = Journal::new();

    let outcome = run_once(
        at(4, 0, 0),
        &window(),
        &CriticalPorts::default(),
        &probe,
        &power,
        &mut journal,
    )
    .await;

    assert_eq!(
        outcome,
        Outcome::ShutdownFailed {
            reason: "/bin/systemctl returned non-zero exit status: 1".to_string()
        }
    );
    assert_eq!(power.calls(), 1);
    assert_eq!(
        messages(&journal).last().unwrap(),
        "Shutdown failed: /bin/systemctl returned non-zero exit status: 1"
    );
}

#[tokio::test]
async fn journal_file_holds_every_decision_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auto_shutdown.log");

    let probe = ScriptedProbe::output(SSH_OUTPUT);
    let power = RecordingPower::default();
    let mut journal = Journal::new();
    journal.attach(FileSink::open(&path).unwrap());

    run_once(
        at(2, 45, 0),
        &window(),
        &CriticalPorts::default(),
        &probe,
        &power,
        &mut journal,
    )
    .await;

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" - INFO - Active network connection detected on critical port :22."));
    assert!(lines[1].ends_with(" - INFO - Shutdown aborted due to active network usage."));
}
