//! Insert-or-update of candidate events against the stored schedule.
//!
//! Two events are the same schedule when they share a date and a title key
//! (see [`crate::title::title_key`]). A repeated schedule only has its time
//! and tag refreshed; it never becomes a second entry.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertKind {
    Created,
    Updated,
}

impl fmt::Display for UpsertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertKind::Created => write!(f, "+"),
            UpsertKind::Updated => write!(f, "~"),
        }
    }
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertEntry {
    pub kind: UpsertKind,
    /// Position of the resulting event in [`UpsertOutcome::events`]. Positions
    /// below the snapshot length refer to existing events.
    pub index: usize,
    pub event: Event,
    /// The stored event before an update
    pub previous: Option<Event>,
}

impl fmt::Display for UpsertEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.event)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertOutcome {
    /// The snapshot with updates applied, followed by the created events
    pub events: Vec<Event>,
    /// One entry per candidate, in candidate order
    pub report: Vec<UpsertEntry>,
}

impl UpsertOutcome {
    pub fn created(&self) -> impl Iterator<Item = &UpsertEntry> {
        self.report.iter().filter(|e| e.kind == UpsertKind::Created)
    }

    pub fn updated(&self) -> impl Iterator<Item = &UpsertEntry> {
        self.report.iter().filter(|e| e.kind == UpsertKind::Updated)
    }
}

/// Merge `candidates` into a copy of `existing`.
///
/// Candidates are also matched against each other, so one utterance naming
/// the same schedule twice yields a single event.
pub fn resolve_upsert(candidates: Vec<Event>, existing: &[Event]) -> UpsertOutcome {
    let mut events = existing.to_vec();
    let mut by_key: HashMap<(NaiveDate, String), usize> = HashMap::new();
    for (i, event) in events.iter().enumerate() {
        by_key.entry(event.key()).or_insert(i);
    }

    let mut report = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let key = candidate.key();
        match by_key.get(&key) {
            Some(&index) => {
                let stored = &mut events[index];
                let previous = stored.clone();
                stored.time = candidate.time;
                stored.tag = candidate.tag;
                debug!(%stored, "updating existing event");
                report.push(UpsertEntry {
                    kind: UpsertKind::Updated,
                    index,
                    event: stored.clone(),
                    previous: Some(previous),
                });
            }
            None => {
                let index = events.len();
                debug!(event = %candidate, "creating event");
                by_key.insert(key, index);
                events.push(candidate.clone());
                report.push(UpsertEntry {
                    kind: UpsertKind::Created,
                    index,
                    event: candidate,
                    previous: None,
                });
            }
        }
    }

    UpsertOutcome { events, report }
}
