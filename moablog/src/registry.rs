/// Load the reservation-definition file and build the project registry.
///
/// The file is generated elsewhere and is mostly commentary; the only lines
/// we care about look like
///
///    ### Reservation gfsmos-06z
///
/// where the base name (alphanumerics and hyphens) is the reservation family
/// and the two-digit code before the trailing `z` is the recurrence hour.
/// Every other line is ignored.  A family seen for the first time becomes a
/// new Project; a family seen again gets another epoch appended, up to the
/// MAX_EPOCHS cap.
use crate::{Project, ProjectStore};

use anyhow::{Context, Result};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};

pub fn read_reservations(file_name: &str) -> Result<ProjectStore> {
    let re = Regex::new(r"### Reservation ([A-Za-z0-9-]+)-([0-9]{2})z")?;
    let file = File::open(file_name)
        .with_context(|| format!("unable to open reservation file {file_name}"))?;

    let mut store = ProjectStore::new();
    let mut reader = BufReader::new(file);
    let mut buf: Vec<u8> = vec![];
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // A non-UTF-8 line cannot match the pattern; skip it like any other
        // junk line.  Only I/O errors abort the load.
        let Ok(line) = std::str::from_utf8(&buf) else {
            continue;
        };
        if let Some(c) = re.captures(line) {
            let name = c.get(1).unwrap().as_str();
            // Two digits by construction, so this parse cannot fail
            let epoch = c.get(2).unwrap().as_str().parse::<u8>().unwrap();
            match store.find_exact_mut(name) {
                Some(p) => p.note_epoch(epoch),
                None => store.add(Project::new(name, epoch)),
            }
        }
    }
    Ok(store)
}

// Whitebox test against a small definition file.  The fixture has two
// families, one recurring four times, plus assorted junk lines that must be
// ignored.

#[test]
fn test_read_reservations() {
    let store = read_reservations("../tests/moablog/whitebox-reservations.cfg").unwrap();
    assert!(store.len() == 2);

    let p = store.find_exact("gfsmos").unwrap();
    assert!(p.epochs == vec![0, 6, 12, 18]);
    assert!(p.reservation_count() == 0 && p.job_count() == 0);

    let q = store.find_exact("hrrr-conus").unwrap();
    assert!(q.epochs == vec![3]);

    // Names appear only stripped of their -NNz suffix
    assert!(store.find_exact("gfsmos-06z").is_none());
}

// The file is machine-generated and occasionally carries binary junk; a
// non-UTF-8 line must be skipped, not abort the load.

#[test]
fn test_read_reservations_non_utf8_line() {
    let store = read_reservations("../tests/moablog/whitebox-reservations-binary.cfg").unwrap();
    assert!(store.len() == 1);
    assert!(store.find_exact("gfsmos").unwrap().epochs == vec![6, 12]);
}

#[test]
fn test_read_reservations_missing_file() {
    assert!(read_reservations("../tests/moablog/no-such-file.cfg").is_err());
}
