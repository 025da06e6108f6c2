/// Single-pass scanner and per-line dispatch for MOAB event logs.
///
/// The log is a fixed-column plaintext format: every line starts with the
/// same timestamp prefix, so the event-type word begins at the same byte
/// offset on every line.  We find the offset of the first alphabetic
/// character on the *first* line and reuse it for the rest of the file; the
/// character at that offset is the event-type code.  This is a documented
/// precondition on the input (the log must be column-stable), not something
/// we validate per line - recomputing the offset for millions of lines is
/// exactly the work this scheme avoids.
///
/// Dispatch is a table indexed directly by the type byte, sized to the
/// largest registered code.  An unregistered code is a no-op and the line is
/// skipped, which makes the scanning loop indifferent to how many event
/// kinds are registered; new kinds are a `register` call, not a change to
/// the loop.
///
/// A line that is too short to carry the type offset, too long to be
/// plausible, or not valid UTF-8 is skipped without aborting the run.  Only
/// I/O errors terminate the scan.
use crate::jobs::JobEndHandler;
use crate::resv::RsvEndHandler;
use crate::ProjectStore;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};

/// Bound on line-buffer growth; the event log has long lines, but anything
/// beyond this is pathological input and is dropped.

const MAXLINE: usize = 65536;

/// A handler for one event-type code.  `handle` takes `&mut self` so that
/// per-scan caches (a compiled pattern, a marker offset) live on the handler
/// instance rather than in process-wide statics.  Handlers must drop
/// unparseable lines silently; there is no per-line error channel.

pub trait EventHandler {
    fn handle(&mut self, line: &str, store: &mut ProjectStore);
}

/// Totals from one scan, for diagnostics.  `skipped` counts lines that were
/// never routed to a handler; lines a handler looked at and dropped are not
/// observable here.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: usize,
    pub skipped: usize,
}

pub struct EventDispatcher {
    // Indexed by event-type byte; None means "skip".
    handlers: Vec<Option<Box<dyn EventHandler>>>,
}

impl EventDispatcher {
    pub fn new() -> EventDispatcher {
        EventDispatcher { handlers: vec![] }
    }

    /// The base dispatcher: `r` lines go to the reservation extractor, `j`
    /// lines to the job extractor.  Fails only if a pattern fails to
    /// compile, which is a static condition.

    pub fn standard() -> Result<EventDispatcher> {
        let mut d = EventDispatcher::new();
        d.register(b'r', Box::new(RsvEndHandler::new()?));
        d.register(b'j', Box::new(JobEndHandler::new()));
        Ok(d)
    }

    /// Register a handler for a type code, growing the table as needed.
    /// Re-registering a code replaces the old handler.

    pub fn register(&mut self, code: u8, handler: Box<dyn EventHandler>) {
        let ix = code as usize;
        if ix >= self.handlers.len() {
            self.handlers.resize_with(ix + 1, || None);
        }
        self.handlers[ix] = Some(handler);
    }

    /// Scan one event log from `reader`, routing each line by its type
    /// byte.  Holds one line in memory at a time.  EOF ends the scan
    /// normally.

    pub fn scan(&mut self, reader: &mut dyn BufRead, store: &mut ProjectStore) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        let mut buf: Vec<u8> = vec![];
        let mut type_offset: Option<usize> = None;

        loop {
            buf.clear();
            // Reading through a take() caps what one line can pull into the
            // buffer; an overlong line shows up as MAXLINE+1 bytes with no
            // terminator.
            if (&mut *reader)
                .take(MAXLINE as u64 + 1)
                .read_until(b'\n', &mut buf)?
                == 0
            {
                break;
            }
            stats.lines += 1;
            let terminated = buf.last() == Some(&b'\n');
            if terminated {
                buf.pop();
            }
            if !terminated && buf.len() > MAXLINE {
                stats.skipped += 1;
                // Spool past the rest of the line in bounded chunks
                loop {
                    buf.clear();
                    if (&mut *reader).take(MAXLINE as u64).read_until(b'\n', &mut buf)? == 0
                        || buf.last() == Some(&b'\n')
                    {
                        break;
                    }
                }
                continue;
            }

            // The offset is computed from the first line and assumed
            // constant for the whole file.
            let eoff = match type_offset {
                Some(o) => o,
                None => {
                    let o = buf
                        .iter()
                        .position(|b| b.is_ascii_alphabetic())
                        .unwrap_or(0);
                    type_offset = Some(o);
                    o
                }
            };

            if eoff >= buf.len() {
                stats.skipped += 1;
                continue;
            }
            let code = buf[eoff] as usize;
            if code >= self.handlers.len() {
                stats.skipped += 1;
                continue;
            }
            let Some(handler) = self.handlers[code].as_mut() else {
                stats.skipped += 1;
                continue;
            };
            let Ok(line) = std::str::from_utf8(&buf) else {
                stats.skipped += 1;
                continue;
            };
            handler.handle(line, store);
        }
        Ok(stats)
    }

    /// Open `file_name` and scan it.  Failure to open is fatal; the handle
    /// is closed on every exit path by scope.

    pub fn scan_eventlog(&mut self, file_name: &str, store: &mut ProjectStore) -> Result<ScanStats> {
        let file = File::open(file_name)
            .with_context(|| format!("unable to open event log {file_name}"))?;
        self.scan(&mut BufReader::new(file), store)
    }
}
