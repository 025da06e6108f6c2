/// Time utilities for the event log tooling.
///
/// MOAB stamps the records themselves with raw Unix seconds, which we carry
/// around as plain i64 and never interpret.  The only calendar arithmetic in
/// the system is computing which day's log file to open, and that is all UTC.
use chrono::prelude::{DateTime, TimeZone, Utc};

pub type Timestamp = DateTime<Utc>;

/// The time right now.

pub fn now() -> Timestamp {
    Utc::now()
}

/// Given year, month, day (all UTC), return a Timestamp at midnight.

pub fn timestamp_from_ymd(y: i32, mo: u32, dy: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, mo, dy, 0, 0, 0).unwrap()
}
