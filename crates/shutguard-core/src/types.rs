//! Core domain types for the shutdown guard.
//!
//! Everything here is transient: built from configuration at the start of a
//! run, consulted once, and dropped when the process exits.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::activity::PortMatch;
use crate::error::{CoreError, Result};

// ── Time of day ───────────────────────────────────────────────────

/// A wall-clock time with minute resolution, e.g. `02:15`.
///
/// Serialized as the string `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Build a time of day, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(CoreError::InvalidTimeOfDay { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// The same instant as a `NaiveTime` with seconds and sub-seconds zeroed.
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
            .expect("TimeOfDay components are validated on construction")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidTimeSpec(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

// ── Maintenance window ────────────────────────────────────────────

/// The daily interval during which an automatic shutdown is allowed.
///
/// Both ends are inclusive and refer to the same calendar day as the
/// instant being tested. Windows crossing midnight cannot be expressed:
/// a window whose start is later than its end never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    #[serde(default = "default_start")]
    pub start: TimeOfDay,
    #[serde(default = "default_end")]
    pub end: TimeOfDay,
}

fn default_start() -> TimeOfDay {
    TimeOfDay { hour: 2, minute: 15 }
}

fn default_end() -> TimeOfDay {
    TimeOfDay { hour: 4, minute: 0 }
}

impl MaintenanceWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// True when `start > end`, i.e. the window can never contain an instant.
    pub fn is_degenerate(&self) -> bool {
        self.start > self.end
    }

    /// Whether `now` falls inside this window. See [`crate::window::in_window`].
    pub fn contains(&self, now: &NaiveDateTime) -> bool {
        crate::window::in_window(now, self)
    }
}

impl Default for MaintenanceWindow {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
        }
    }
}

impl fmt::Display for MaintenanceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ── Critical ports ────────────────────────────────────────────────

/// Ordered list of literal markers (e.g. `":22"`) whose presence in an
/// established-connection line blocks the shutdown.
///
/// Matching is plain substring containment over the raw line. `":22"`
/// therefore also matches `":2200"`, `":1220"`, or the marker appearing in
/// either address column. Tightening this changes which hosts stay up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriticalPorts(Vec<String>);

impl CriticalPorts {
    /// Build a port set, rejecting empty markers (they would match every line).
    pub fn new<I, S>(markers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ports = Self(markers.into_iter().map(Into::into).collect());
        ports.validate()?;
        Ok(ports)
    }

    /// Check that no marker is empty.
    pub fn validate(&self) -> Result<()> {
        match self.0.iter().position(|m| m.is_empty()) {
            Some(index) => Err(CoreError::EmptyPortMarker { index }),
            None => Ok(()),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scan `output` line by line and return the first line containing any
    /// marker, together with the marker that hit.
    ///
    /// Lines are visited in order; within a line, markers are tried in
    /// configured order.
    pub fn first_match(&self, output: &str) -> Option<PortMatch> {
        output.lines().find_map(|line| {
            self.0
                .iter()
                .find(|marker| line.contains(marker.as_str()))
                .map(|marker| PortMatch {
                    marker: marker.clone(),
                    line: line.to_string(),
                })
        })
    }
}

impl Default for CriticalPorts {
    fn default() -> Self {
        Self(vec![
            ":22".to_string(),
            ":47984".to_string(),
            ":47989".to_string(),
        ])
    }
}
