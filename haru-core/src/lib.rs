//! Natural-language schedule compiler for haru.
//!
//! This crate turns free-form Korean text into schedule changes:
//! - `datetime` normalizes date and clock expressions against a caller-supplied now
//! - `classify` and `intent` decide what the text asks for
//! - `extract` and `distribute` produce events
//! - `upsert` merges them into a snapshot of the stored schedule
//!
//! It performs no I/O. Storage, memory persistence and the clock belong to the caller.

pub mod classify;
pub mod datetime;
pub mod dday;
pub mod distribute;
pub mod error;
pub mod event;
pub mod extract;
pub mod intent;
pub mod memory;
pub mod pipeline;
pub mod settings;
pub mod subjects;
pub mod title;
pub mod upsert;

pub use classify::{CLASSIFICATION_RULES, IntentTag, classify};
pub use datetime::{Normalized, normalize};
pub use dday::{DdayAnswer, dday_label};
pub use distribute::{Planner, StudyBlock, distribute};
pub use error::{HaruError, HaruResult};
pub use event::{Event, Priority};
pub use extract::{Clause, DropReason, Extraction, extract, extract_events, split_clauses};
pub use intent::{Intent, ParsedIntent, parse_intent, parse_intent_with};
pub use memory::{MemoryField, MemoryState};
pub use pipeline::{Compilation, Compiler, Outcome, compile};
pub use settings::PlannerSettings;
pub use subjects::{AllocationKind, SubjectAllocation};
pub use upsert::{UpsertEntry, UpsertKind, UpsertOutcome, resolve_upsert};
