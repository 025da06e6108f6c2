/// In-memory model of projects and their attributed events.
///
/// A *project* is one logical reservation family: a base name from the
/// reservation definition file, recurring at one or more hour-of-day codes
/// ("epochs", 0-23 by convention).  The registry loader creates projects;
/// the log scan only ever attaches events to existing ones.  A line naming
/// an unknown project is dropped by the extractors, so the project set is
/// fixed for the duration of a scan.
///
/// Events are held newest-first: extraction pushes on the front, which keeps
/// attachment O(1) for logs that run into the millions of lines.  Consumers
/// that want chronological order (the serializer does) iterate the deques in
/// reverse; the scanning side never sees the reversed order.
use std::collections::VecDeque;

use ustr::Ustr;

/// Cap on the number of epoch codes recorded per project.  Appends beyond
/// this are discarded silently.

pub const MAX_EPOCHS: usize = 24;

/// One scheduler event, shared shape for both kinds.  For a reservation,
/// `id` is the numeric suffix distinguishing same-day instances of the same
/// reservation; for a job it is the DRM job id.  `start` and `end` are raw
/// Unix seconds as they appear in the log.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub epoch: u8,
    pub id: i64,
    pub nodes: i64,
    pub start: i64,
    pub end: i64,
}

/// One reservation family and everything attributed to it.

#[derive(Debug)]
pub struct Project {
    pub name: Ustr,

    /// Hour codes under which the family recurs, in encounter order, at most
    /// MAX_EPOCHS of them.  Not deduplicated.
    pub epochs: Vec<u8>,

    /// Reservation events, newest first.
    pub reservations: VecDeque<Event>,

    /// Job events, newest first.
    pub jobs: VecDeque<Event>,
}

impl Project {
    pub fn new(name: &str, first_epoch: u8) -> Project {
        Project {
            name: Ustr::from(name),
            epochs: vec![first_epoch],
            reservations: VecDeque::new(),
            jobs: VecDeque::new(),
        }
    }

    /// Record another recurrence hour, dropping it silently once the epoch
    /// list is full.

    pub fn note_epoch(&mut self, epoch: u8) {
        if self.epochs.len() < MAX_EPOCHS {
            self.epochs.push(epoch);
        }
    }

    /// Attach a reservation event, reconciling against what we already hold.
    ///
    /// MOAB creates a reservation record even when not all nodes are
    /// available, and recreates it - same end time, new node count - when
    /// more nodes are added.  An incoming event whose `end` equals an
    /// existing event's `end` is therefore an update of that record, not a
    /// new occurrence: `start` and `nodes` are overwritten and the count is
    /// unchanged.  Anything else is a genuinely new event, pushed on the
    /// front.

    pub fn upsert_reservation(&mut self, ev: Event) {
        for existing in self.reservations.iter_mut() {
            if existing.end == ev.end {
                existing.start = ev.start;
                existing.nodes = ev.nodes;
                return;
            }
        }
        self.reservations.push_front(ev);
    }

    /// Attach a completed job.  Jobs are never deduplicated; every matched
    /// line yields a record.

    pub fn add_job(&mut self, ev: Event) {
        self.jobs.push_front(ev);
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// True iff the project owns any event at all; projects for which this
    /// is false are omitted from the output entirely.

    pub fn has_events(&self) -> bool {
        !self.reservations.is_empty() || !self.jobs.is_empty()
    }
}

/// The set of known projects.  Unordered as far as clients are concerned;
/// iteration order happens to be registry encounter order.

#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: Vec<Project>,
}

impl ProjectStore {
    pub fn new() -> ProjectStore {
        ProjectStore { projects: vec![] }
    }

    pub fn add(&mut self, p: Project) {
        self.projects.push(p);
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Project> {
        self.projects.iter()
    }

    /// Exact-name lookup, used for job attribution.

    pub fn find_exact_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.name.as_str() == name)
    }

    pub fn find_exact(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name.as_str() == name)
    }

    /// Prefix lookup, used for reservation attribution: the first project
    /// whose name starts with `name` wins.  The event log decorates
    /// reservation names with suffixes the definition file omits, so the
    /// parsed name can be shorter than the project name.  This asymmetry
    /// with job attribution is deliberate.

    pub fn find_prefix_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.name.starts_with(name))
    }
}

#[test]
fn test_epoch_cap() {
    let mut p = Project::new("gfsmos", 0);
    for e in 1..40u8 {
        p.note_epoch(e);
    }
    assert!(p.epochs.len() == MAX_EPOCHS);
    // Encounter order, first MAX_EPOCHS survive
    assert!(p.epochs[0] == 0);
    assert!(p.epochs[MAX_EPOCHS - 1] == (MAX_EPOCHS - 1) as u8);
}

#[test]
fn test_upsert_reservation() {
    let mut p = Project::new("gfsmos", 6);
    p.upsert_reservation(Event {
        epoch: 6,
        id: 1,
        nodes: 10,
        start: 100,
        end: 1000,
    });
    p.upsert_reservation(Event {
        epoch: 6,
        id: 2,
        nodes: 12,
        start: 150,
        end: 2000,
    });
    assert!(p.reservation_count() == 2);
    // Newest first
    assert!(p.reservations[0].end == 2000);
    assert!(p.reservations[1].end == 1000);

    // Same end: update in place, count unchanged
    p.upsert_reservation(Event {
        epoch: 6,
        id: 1,
        nodes: 16,
        start: 90,
        end: 1000,
    });
    assert!(p.reservation_count() == 2);
    assert!(p.reservations[1].nodes == 16);
    assert!(p.reservations[1].start == 90);
    // The original id is retained; the update only revises start/nodes
    assert!(p.reservations[1].id == 1);
}

#[test]
fn test_lookup_asymmetry() {
    let mut store = ProjectStore::new();
    store.add(Project::new("nodeset", 8));
    store.add(Project::new("nodeset-ops", 14));

    // Prefix lookup tolerates a parsed name shorter than the project name
    assert!(store.find_prefix_mut("nodeset").unwrap().name.as_str() == "nodeset");
    assert!(store.find_prefix_mut("nodeset-o").unwrap().name.as_str() == "nodeset-ops");
    assert!(store.find_prefix_mut("nodesetx").is_none());

    // Exact lookup does not
    assert!(store.find_exact_mut("nodeset-ops").is_some());
    assert!(store.find_exact_mut("nodeset-o").is_none());
}
