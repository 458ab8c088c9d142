//! JSON storage for events and conversation memory.
//!
//! Both files live in the configured data directory and are replaced
//! atomically (write to a temp file, then rename).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use haru_core::{Event, MemoryState, UpsertOutcome};
use serde::{Deserialize, Serialize};
use tracing::debug;

const EVENTS_FILE: &str = "events.json";
const MEMORY_FILE: &str = "memory.json";

/// An event with the id used by `list` and `remove`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EventsFile {
    next_id: u64,
    events: Vec<StoredEvent>,
}

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    /// Stored events in insertion order.
    pub fn events(&self) -> Result<Vec<StoredEvent>> {
        Ok(self.read_events()?.events)
    }

    /// Stored events ordered by date, all-day events first within a day.
    pub fn sorted_events(&self) -> Result<Vec<StoredEvent>> {
        let mut events = self.events()?;
        events.sort_by(|a, b| {
            (a.event.date, a.event.time, a.id).cmp(&(b.event.date, b.event.time, b.id))
        });
        Ok(events)
    }

    /// Write back an upsert computed against `snapshot`.
    ///
    /// Outcome indices below `snapshot.len()` refer to snapshot entries and
    /// are matched back by id; the rest are new events.
    pub fn apply(&self, snapshot: &[StoredEvent], outcome: &UpsertOutcome) -> Result<Vec<StoredEvent>> {
        let mut file = self.read_events()?;
        let mut ids: HashMap<usize, u64> = snapshot.iter().map(|s| s.id).enumerate().collect();
        let mut touched = Vec::with_capacity(outcome.report.len());

        for entry in &outcome.report {
            let event = outcome
                .events
                .get(entry.index)
                .with_context(|| format!("Upsert refers to missing event #{}", entry.index))?
                .clone();

            let current = ids
                .get(&entry.index)
                .and_then(|id| file.events.iter_mut().find(|s| s.id == *id));
            let stored = match current {
                Some(current) => {
                    current.event = event;
                    current.clone()
                }
                None => {
                    let stored = push_new(&mut file, event);
                    ids.insert(entry.index, stored.id);
                    stored
                }
            };
            debug!(id = stored.id, kind = %entry.kind, "stored event");
            touched.push(stored);
        }

        self.write_events(&file)?;
        Ok(touched)
    }

    /// Remove an event by id, returning it if it existed.
    pub fn remove(&self, id: u64) -> Result<Option<StoredEvent>> {
        let mut file = self.read_events()?;
        let Some(pos) = file.events.iter().position(|s| s.id == id) else {
            return Ok(None);
        };

        let removed = file.events.remove(pos);
        self.write_events(&file)?;
        Ok(Some(removed))
    }

    pub fn memory(&self) -> Result<MemoryState> {
        let path = self.dir.join(MEMORY_FILE);
        if !path.exists() {
            return Ok(MemoryState::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid memory in {}", path.display()))
    }

    pub fn save_memory(&self, memory: &MemoryState) -> Result<()> {
        let content = serde_json::to_string_pretty(memory)?;
        self.write_atomic(MEMORY_FILE, &content)
    }

    pub fn reset_memory(&self) -> Result<()> {
        self.save_memory(&MemoryState::default())
    }

    fn read_events(&self) -> Result<EventsFile> {
        let path = self.dir.join(EVENTS_FILE);
        if !path.exists() {
            return Ok(EventsFile {
                next_id: 1,
                events: Vec::new(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid events in {}", path.display()))
    }

    fn write_events(&self, file: &EventsFile) -> Result<()> {
        let content = serde_json::to_string_pretty(file)?;
        self.write_atomic(EVENTS_FILE, &content)
    }

    fn write_atomic(&self, name: &str, content: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Could not create {}", self.dir.display()))?;

        let path = self.dir.join(name);
        let temp = self.dir.join(format!("{name}.tmp"));

        std::fs::write(&temp, content).with_context(|| format!("Could not write {}", temp.display()))?;
        std::fs::rename(&temp, &path).with_context(|| format!("Could not replace {}", path.display()))?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn push_new(file: &mut EventsFile, event: Event) -> StoredEvent {
    let stored = StoredEvent {
        id: file.next_id.max(1),
        event,
    };
    file.next_id = stored.id + 1;
    file.events.push(stored.clone());
    stored
}
