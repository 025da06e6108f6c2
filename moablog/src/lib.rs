/// Read MOAB event logs and reconcile reservations and jobs by project.
///
/// A MOAB installation produces two inputs we care about.  The *reservation
/// definition file* names every standing reservation family and the hours of
/// day ("epochs") it recurs at.  The daily *event log* is a plaintext,
/// fixed-column record of everything the scheduler did; the lines that
/// matter here are reservation-end (RSVEND) and job-end (JOBEND) records.
///
/// This library's task is to rebuild, from one day's log, which reservation
/// instances existed and which completed jobs ran under which family:
///
/// - Build the project registry from the definition file.  Projects are
///   created here and only here.
///
/// - Locate the day's log by its date-derived name.
///
/// - Stream the log exactly once, classifying each line by the event-type
///   character at a fixed column and routing it to a per-type extractor.
///
/// - Attribute each extracted record to its owning project, collapsing
///   MOAB's recreate-with-more-nodes reservation records into one canonical
///   record per instance (keyed by end time).
///
/// Corrupt or unrecognized lines are dropped silently; the log is written
/// concurrently with everything else the scheduler does and partial or odd
/// records are a fact of life.  Only file-level I/O errors abort a scan.
mod dates;
mod jobs;
mod logfile;
mod logtree;
mod project;
mod registry;
mod resv;

// Types and utilities for manipulating timestamps.

pub use dates::now;
pub use dates::timestamp_from_ymd;
pub use dates::Timestamp;

// The project/event model the extractors populate and the serializer reads.

pub use project::Event;
pub use project::Project;
pub use project::ProjectStore;
pub use project::MAX_EPOCHS;

// Build the project registry from a reservation definition file.

pub use registry::read_reservations;

// Compute the date-derived event log path for a day offset.

pub use logtree::eventlog_name;
pub use logtree::find_eventlog;

// Single-pass scanner with per-line event-type dispatch.

pub use logfile::EventDispatcher;
pub use logfile::EventHandler;
pub use logfile::ScanStats;

// The two base extractors, registered by EventDispatcher::standard() and
// exposed for dispatchers with custom tables.

pub use jobs::JobEndHandler;
pub use resv::RsvEndHandler;
