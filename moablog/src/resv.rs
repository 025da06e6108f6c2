/// Extractor for reservation-lifecycle lines.
///
/// Only RSVEND lines matter: they carry the full description of one
/// reservation instance, `NAME=<family>-<NN>z.<seq>` followed by
/// STARTTIME/ENDTIME/ALLOCTC.  The pattern is compiled once when the
/// handler is constructed and reused for the whole scan.
///
/// Attribution is by *prefix*: the name in the log may carry decorations
/// the definition file omits, so the parsed family name must match the
/// leading characters of a project's name.  Job attribution (jobs.rs) is
/// exact; do not unify the two.
use crate::logfile::EventHandler;
use crate::{Event, ProjectStore};

use anyhow::Result;
use regex::Regex;

pub struct RsvEndHandler {
    re: Regex,
}

impl RsvEndHandler {
    pub fn new() -> Result<RsvEndHandler> {
        // Field order is fixed in the log.  All captures are digit runs
        // except the family name.
        let re = Regex::new(
            r"RSVEND.*NAME=([A-Za-z0-9-]+)-([0-9]{2})z\.([0-9]+).*STARTTIME=([0-9]+).*ENDTIME=([0-9]+).*ALLOCTC=([0-9]+)",
        )?;
        Ok(RsvEndHandler { re })
    }
}

impl EventHandler for RsvEndHandler {
    fn handle(&mut self, line: &str, store: &mut ProjectStore) {
        let Some(c) = self.re.captures(line) else {
            return;
        };
        let name = c.get(1).unwrap().as_str();
        // A capture that is all digits can still overflow its type; treat
        // that like any other unparseable line.
        let (Some(epoch), Some(id), Some(start), Some(end), Some(nodes)) = (
            get_u8(c.get(2).unwrap().as_str()),
            get_i64(c.get(3).unwrap().as_str()),
            get_i64(c.get(4).unwrap().as_str()),
            get_i64(c.get(5).unwrap().as_str()),
            get_i64(c.get(6).unwrap().as_str()),
        ) else {
            return;
        };
        let Some(p) = store.find_prefix_mut(name) else {
            // Unknown family: drop, not an error
            return;
        };
        p.upsert_reservation(Event {
            epoch,
            id,
            nodes,
            start,
            end,
        });
    }
}

fn get_u8(s: &str) -> Option<u8> {
    s.parse::<u8>().ok()
}

fn get_i64(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
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

    #[test]
    fn test_new_reservation() {
        let mut store = store_with("gfsmos", 6);
        let mut h = RsvEndHandler::new().unwrap();
        h.handle(
            "07:01:36 rsv gfsmos-06z.3 RSVEND 1469862096 NAME=gfsmos-06z.3 STARTTIME=1469862000 ENDTIME=1469865600 ALLOCTC=128",
            &mut store,
        );
        let p = store.find_exact("gfsmos").unwrap();
        assert!(p.reservation_count() == 1);
        let r = &p.reservations[0];
        assert!(r.epoch == 6 && r.id == 3 && r.nodes == 128);
        assert!(r.start == 1469862000 && r.end == 1469865600);
    }

    #[test]
    fn test_update_keyed_by_end() {
        let mut store = store_with("gfsmos", 6);
        let mut h = RsvEndHandler::new().unwrap();
        h.handle(
            "x rsv RSVEND 1 NAME=gfsmos-06z.1 STARTTIME=100 ENDTIME=1000 ALLOCTC=4",
            &mut store,
        );
        h.handle(
            "x rsv RSVEND 2 NAME=gfsmos-06z.1 STARTTIME=90 ENDTIME=1000 ALLOCTC=9",
            &mut store,
        );
        let p = store.find_exact("gfsmos").unwrap();
        assert!(p.reservation_count() == 1);
        assert!(p.reservations[0].start == 90 && p.reservations[0].nodes == 9);

        // A different end time is a new occurrence, newest first
        h.handle(
            "x rsv RSVEND 3 NAME=gfsmos-06z.2 STARTTIME=1100 ENDTIME=2000 ALLOCTC=4",
            &mut store,
        );
        let p = store.find_exact("gfsmos").unwrap();
        assert!(p.reservation_count() == 2);
        assert!(p.reservations[0].end == 2000);
    }

    #[test]
    fn test_prefix_attribution() {
        // The log decorates the name; the project name is longer than the
        // parsed prefix and still matches.
        let mut store = store_with("nodeset-ops", 8);
        let mut h = RsvEndHandler::new().unwrap();
        h.handle(
            "x rsv RSVEND 1 NAME=nodeset-08z.1 STARTTIME=1 ENDTIME=2 ALLOCTC=3",
            &mut store,
        );
        assert!(store.find_exact("nodeset-ops").unwrap().reservation_count() == 1);
    }

    #[test]
    fn test_unknown_name_dropped() {
        let mut store = store_with("gfsmos", 6);
        let mut h = RsvEndHandler::new().unwrap();
        h.handle(
            "x rsv RSVEND 1 NAME=rapqc-06z.1 STARTTIME=1 ENDTIME=2 ALLOCTC=3",
            &mut store,
        );
        assert!(store.find_exact("gfsmos").unwrap().reservation_count() == 0);
    }

    #[test]
    fn test_non_rsvend_lines_dropped() {
        let mut store = store_with("gfsmos", 6);
        let mut h = RsvEndHandler::new().unwrap();
        // RSVSTART does not match, nor does a truncated RSVEND line
        h.handle(
            "x rsv RSVSTART 1 NAME=gfsmos-06z.1 STARTTIME=1 ENDTIME=2 ALLOCTC=3",
            &mut store,
        );
        h.handle("x rsv RSVEND 1 NAME=gfsmos-06z.1 STARTTIME=1", &mut store);
        assert!(store.find_exact("gfsmos").unwrap().reservation_count() == 0);
    }
}
