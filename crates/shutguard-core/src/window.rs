//! Maintenance window gate.

use chrono::{NaiveDateTime, NaiveTime};

use crate::types::MaintenanceWindow;

/// Return true if `now` lies inside `window`.
///
/// The window bounds are placed on `now`'s own calendar date with seconds
/// and sub-seconds zeroed, and the test is `start <= now <= end`. `now`
/// keeps its full precision, so `04:00:00.000001` is already past an
/// `04:00` end.
pub fn in_window(now: &NaiveDateTime, window: &MaintenanceWindow) -> bool {
    let date = now.date();
    let start = date.and_time(window.start.to_naive_time());
    let end = date.and_time(window.end.to_naive_time());
    start <= *now && *now <= end
}

/// Same test as [`in_window`] with the bounds given as raw hour/minute pairs.
///
/// Components that do not form a valid time of day yield `false`.
pub fn in_window_hm(
    now: &NaiveDateTime,
    start_hour: u32,
    start_min: u32,
    end_hour: u32,
    end_min: u32,
) -> bool {
    let (Some(start), Some(end)) = (
        NaiveTime::from_hms_opt(start_hour, start_min, 0),
        NaiveTime::from_hms_opt(end_hour, end_min, 0),
    ) else {
        return false;
    };

    let date = now.date();
    date.and_time(start) <= *now && *now <= date.and_time(end)
}
