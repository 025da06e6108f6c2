/// Serialize the reconciled project set.
///
/// The output is one JSON document, a named group per project.  Each group
/// carries an `Epochs` attribute (the recurrence hours in encounter order)
/// and, when the project owns events of the kind, a `reservations` and/or
/// `jobs` sub-group of five parallel arrays.  Projects with no attributed
/// events at all are omitted.
///
/// The store holds events newest-first; the arrays here are chronological,
/// so the deques are reversed at this boundary and nowhere else.
use anyhow::Result;
use moablog::{Event, Project, ProjectStore};
use serde::Serialize;
use std::collections::VecDeque;
use std::io::Write;

#[derive(Serialize)]
struct EventArrays {
    epochs: Vec<i32>,
    ids: Vec<i64>,
    nodes: Vec<i64>,
    starts: Vec<i64>,
    ends: Vec<i64>,
}

#[derive(Serialize)]
struct ProjectGroup {
    #[serde(rename = "Epochs")]
    epochs: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reservations: Option<EventArrays>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jobs: Option<EventArrays>,
}

/// Write every project that owns events, or just the named one if `only` is
/// given.

pub fn write_projects(w: &mut dyn Write, store: &ProjectStore, only: Option<&str>) -> Result<()> {
    let mut doc = serde_json::Map::new();
    for p in store.iter() {
        if !p.has_events() {
            continue;
        }
        if let Some(name) = only {
            if p.name.as_str() != name {
                continue;
            }
        }
        doc.insert(p.name.to_string(), serde_json::to_value(group_of(p))?);
    }
    serde_json::to_writer_pretty(&mut *w, &serde_json::Value::Object(doc))?;
    w.write_all(b"\n")?;
    Ok(())
}

fn group_of(p: &Project) -> ProjectGroup {
    ProjectGroup {
        epochs: p.epochs.iter().map(|&e| e as i32).collect(),
        reservations: if p.reservation_count() > 0 {
            Some(arrays_of(&p.reservations))
        } else {
            None
        },
        jobs: if p.job_count() > 0 {
            Some(arrays_of(&p.jobs))
        } else {
            None
        },
    }
}

// Newest-first in, chronological out.

fn arrays_of(events: &VecDeque<Event>) -> EventArrays {
    let mut a = EventArrays {
        epochs: Vec::with_capacity(events.len()),
        ids: Vec::with_capacity(events.len()),
        nodes: Vec::with_capacity(events.len()),
        starts: Vec::with_capacity(events.len()),
        ends: Vec::with_capacity(events.len()),
    };
    for ev in events.iter().rev() {
        a.epochs.push(ev.epoch as i32);
        a.ids.push(ev.id);
        a.nodes.push(ev.nodes);
        a.starts.push(ev.start);
        a.ends.push(ev.end);
    }
    a
}
