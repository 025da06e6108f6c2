/// Locate the event log for a given day.
///
/// MOAB writes one event log per day into the statistics directory, named
/// after the UTC date, e.g. `events.Sat_Jul_30_2016`.  The file for a run is
/// a pure function of the current time, the day offset, and the directory;
/// nothing here touches the file system.
use crate::dates::{now, Timestamp};

use chrono::Duration;

/// The file name (without directory) of the event log covering the day of
/// `t`, in UTC.

pub fn eventlog_name(t: Timestamp) -> String {
    format!("events.{}", t.format("%a_%b_%d_%Y"))
}

/// Full path of the event log for `now + day_offset` days in `stats_dir`.

pub fn find_eventlog(stats_dir: &str, day_offset: i64) -> String {
    let t = now() + Duration::days(day_offset);
    format!("{}/{}", stats_dir, eventlog_name(t))
}

#[test]
fn test_eventlog_name() {
    use crate::dates::timestamp_from_ymd;
    assert!(eventlog_name(timestamp_from_ymd(2016, 7, 30)) == "events.Sat_Jul_30_2016");
    // Single-digit days keep their leading zero
    assert!(eventlog_name(timestamp_from_ymd(2023, 1, 2)) == "events.Mon_Jan_02_2023");
}

#[test]
fn test_find_eventlog_join() {
    let p = find_eventlog("/misc/moab/moabhome/stats", 0);
    assert!(p.starts_with("/misc/moab/moabhome/stats/events."));
}
