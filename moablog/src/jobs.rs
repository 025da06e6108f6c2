/// Extractor for job-completion lines.
///
/// A job line is identified by a JOBEND marker whose byte offset within the
/// line is constant across the file, like the dispatcher's type-character
/// column.  The offset is found with a substring search on the first line
/// that carries the marker and cached on the handler for the rest of the
/// scan.
///
/// The reservation a job ran under comes from the `REQRSV=` field.  When
/// the value ends in the `-NNz` recurrence suffix that suffix is stripped
/// (it also yields the event's epoch) and the remainder must *exactly*
/// equal a project's name - jobs reference reservations undecorated, unlike
/// reservation lines, so no prefix matching here.
use crate::logfile::EventHandler;
use crate::{Event, ProjectStore};

pub struct JobEndHandler {
    // Offset of "JOBEND" within a job line, once seen.
    marker_offset: Option<usize>,
}

impl JobEndHandler {
    pub fn new() -> JobEndHandler {
        JobEndHandler {
            marker_offset: None,
        }
    }
}

const JOBEND: &[u8] = b"JOBEND";

impl EventHandler for JobEndHandler {
    fn handle(&mut self, line: &str, store: &mut ProjectStore) {
        let off = match self.marker_offset {
            Some(o) => o,
            None => {
                let Some(o) = line.find("JOBEND") else {
                    return;
                };
                self.marker_offset = Some(o);
                o
            }
        };
        let bytes = line.as_bytes();
        if off + JOBEND.len() > bytes.len() || &bytes[off..off + JOBEND.len()] != JOBEND {
            return;
        }

        let Some(rsv) = field_str(line, "REQRSV=") else {
            return;
        };

        // Strip a trailing -NNz recurrence suffix; it carries the epoch.
        let (name, epoch) = match strip_epoch_suffix(rsv) {
            Some((base, e)) => (base, e),
            None => (rsv, 0),
        };

        let Some(p) = store.find_exact_mut(name) else {
            // Jobs under unknown reservations are dropped
            return;
        };

        // Node count is optional and defaults to 1; everything else is
        // required and its absence drops the line.  COMPLETETIME is sought
        // after STARTTIME and DRMJID after that, following the field order
        // of the log.
        let nodes = field_i64(line, "REQUESTEDNC=").unwrap_or(1);
        let Some((start, rest)) = field_i64_at(line, "STARTTIME=") else {
            return;
        };
        let Some((end, rest)) = field_i64_at(rest, "COMPLETETIME=") else {
            return;
        };
        let Some((id, _)) = field_i64_at(rest, "DRMJID=") else {
            return;
        };

        p.add_job(Event {
            epoch,
            id,
            nodes,
            start,
            end,
        });
    }
}

/// The value of `key` up to the next space, or to end of line.

fn field_str<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    match rest.find(' ') {
        Some(n) => Some(&rest[..n]),
        None => Some(rest),
    }
}

/// If `value` ends in `-NNz` with NN two digits, return the base name and
/// the parsed epoch.

fn strip_epoch_suffix(value: &str) -> Option<(&str, u8)> {
    let b = value.as_bytes();
    let n = b.len();
    if n >= 4
        && b[n - 1] == b'z'
        && b[n - 2].is_ascii_digit()
        && b[n - 3].is_ascii_digit()
        && b[n - 4] == b'-'
    {
        let epoch = value[n - 3..n - 1].parse::<u8>().ok()?;
        Some((&value[..n - 4], epoch))
    } else {
        None
    }
}

/// Parse the integer following `key`, returning it along with the rest of
/// the line after the key, so callers can chain searches in field order.

fn field_i64_at<'a>(line: &'a str, key: &str) -> Option<(i64, &'a str)> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits == 0 {
        return None;
    }
    let n = rest[..digits].parse::<i64>().ok()?;
    Some((n, &rest[digits..]))
}

fn field_i64(line: &str, key: &str) -> Option<i64> {
    field_i64_at(line, key).map(|(n, _)| n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Project;

    fn store_with(name: &str, epoch: u8) -> ProjectStore {
        let mut store = ProjectStore::new();
        store.add(Project::new(name, epoch));
        store
    }

    const JOB_LINE: &str = "07:05:00 job 1234.fe1 JOBEND 1234 REQRSV=gfsmos-06z \
                            REQUESTEDNC=12 STARTTIME=600 COMPLETETIME=900 DRMJID=4242 USER=nwprod";

    #[test]
    fn test_job_attribution() {
        let mut store = store_with("gfsmos", 6);
        let mut h = JobEndHandler::new();
        h.handle(JOB_LINE, &mut store);
        let p = store.find_exact("gfsmos").unwrap();
        assert!(p.job_count() == 1);
        let j = &p.jobs[0];
        assert!(j.epoch == 6 && j.id == 4242 && j.nodes == 12);
        assert!(j.start == 600 && j.end == 900);
    }

    #[test]
    fn test_exact_match_only() {
        // "gfsmos" is a prefix of the project name but not equal to it;
        // unlike reservation attribution this must not match.
        let mut store = store_with("gfsmos-ops", 6);
        let mut h = JobEndHandler::new();
        h.handle(JOB_LINE, &mut store);
        assert!(store.find_exact("gfsmos-ops").unwrap().job_count() == 0);
    }

    #[test]
    fn test_unsuffixed_reqrsv() {
        let mut store = store_with("gfsmos", 6);
        let mut h = JobEndHandler::new();
        h.handle(
            "07:05:00 job 1.fe1 JOBEND 1 REQRSV=gfsmos STARTTIME=1 COMPLETETIME=2 DRMJID=3",
            &mut store,
        );
        let p = store.find_exact("gfsmos").unwrap();
        assert!(p.job_count() == 1);
        // No suffix: no epoch information, and the node count defaults
        assert!(p.jobs[0].epoch == 0);
        assert!(p.jobs[0].nodes == 1);
    }

    #[test]
    fn test_missing_required_field_drops_line() {
        let mut store = store_with("gfsmos", 6);
        let mut h = JobEndHandler::new();
        // No COMPLETETIME
        h.handle(
            "07:05:00 job 1.fe1 JOBEND 1 REQRSV=gfsmos-06z STARTTIME=1 DRMJID=3",
            &mut store,
        );
        // COMPLETETIME present but before STARTTIME, so the ordered search
        // cannot see it
        h.handle(
            "07:05:00 job 1.fe1 JOBEND 1 REQRSV=gfsmos-06z COMPLETETIME=2 STARTTIME=1 DRMJID=3",
            &mut store,
        );
        assert!(store.find_exact("gfsmos").unwrap().job_count() == 0);
    }

    #[test]
    fn test_marker_offset_cached() {
        let mut store = store_with("gfsmos", 6);
        let mut h = JobEndHandler::new();
        h.handle(JOB_LINE, &mut store);
        assert!(h.marker_offset == Some(22));
        // A line that says JOBEND elsewhere than the cached column is not a
        // job end
        h.handle(
            "07:05:00 job 9.fe1 JOBSTART 9 NOTE=JOBEND REQRSV=gfsmos-06z STARTTIME=1 COMPLETETIME=2 DRMJID=3",
            &mut store,
        );
        assert!(store.find_exact("gfsmos").unwrap().job_count() == 1);
    }

    #[test]
    fn test_no_marker_leaves_cache_unset() {
        let mut store = store_with("gfsmos", 6);
        let mut h = JobEndHandler::new();
        h.handle("07:05:00 job 9.fe1 JOBSTART 9 REQRSV=gfsmos-06z", &mut store);
        assert!(h.marker_offset.is_none());
        // The next genuine JOBEND still sets it
        h.handle(JOB_LINE, &mut store);
        assert!(h.marker_offset == Some(22));
    }
}
