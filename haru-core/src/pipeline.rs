//! The end-to-end compiler: text in, proposed schedule changes out.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::classify::IntentTag;
use crate::dday::DdayAnswer;
use crate::distribute::Planner;
use crate::error::HaruResult;
use crate::event::{Event, Priority};
use crate::extract::{DroppedClause, extract_events};
use crate::intent::{Intent, parse_intent_with};
use crate::memory::{MemoryField, MemoryState, MemoryUpdate};
use crate::settings::PlannerSettings;
use crate::upsert::{UpsertOutcome, resolve_upsert};

/// What a compiled utterance asks the caller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Store `upsert.events`. `dropped` lists clauses that produced nothing.
    Scheduled {
        upsert: UpsertOutcome,
        dropped: Vec<DroppedClause>,
    },
    /// Answer only; nothing to store.
    Dday(DdayAnswer),
    /// No schedule action.
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub tag: IntentTag,
    pub outcome: Outcome,
    pub memory_fills: Vec<MemoryField>,
    /// Memory to persist if the caller accepts the outcome
    pub proposed_memory: MemoryState,
}

impl Compilation {
    pub fn used_memory(&self) -> bool {
        !self.memory_fills.is_empty()
    }
}

/// Runs normalize → classify → resolve memory → extract or distribute → upsert.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    planner: Planner,
}

impl Compiler {
    pub fn new(settings: PlannerSettings) -> Self {
        Compiler {
            planner: Planner::new(settings),
        }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Compile `text` against read-only snapshots of memory and the stored
    /// events. Nothing is mutated; the caller applies the result.
    pub fn compile(
        &self,
        text: &str,
        now: NaiveDateTime,
        memory: &MemoryState,
        existing: &[Event],
    ) -> HaruResult<Compilation> {
        let parsed = parse_intent_with(text, now, memory, self.planner.settings())?;
        debug!(tag = %parsed.tag, fills = parsed.memory_fills.len(), "parsed intent");

        let mut proposed_memory = parsed.proposed_memory;
        let outcome = match parsed.intent {
            Intent::RegisterEvents(clauses) => {
                let extraction = extract_events(&clauses, now)?;

                // registering an exam also remembers its date
                if let Some(exam) = extraction
                    .events
                    .iter()
                    .find(|e| e.tag == Priority::Exam && e.date >= now.date())
                {
                    let update = MemoryUpdate {
                        exam_date: Some(exam.date),
                        ..MemoryUpdate::default()
                    };
                    proposed_memory = update.apply_to(&proposed_memory);
                }

                Outcome::Scheduled {
                    upsert: resolve_upsert(extraction.events, existing),
                    dropped: extraction.dropped,
                }
            }
            Intent::StudyPlan {
                subject,
                days,
                hours_per_day,
            } => {
                let events = self.planner.study_plan(&subject, days, hours_per_day, now);
                Outcome::Scheduled {
                    upsert: resolve_upsert(events, existing),
                    dropped: Vec::new(),
                }
            }
            Intent::ExamDistribution {
                exam_date,
                exam_label,
                allocations,
                daily_hours,
            } => {
                let events = self.planner.distribute(
                    exam_date,
                    now,
                    &allocations,
                    daily_hours,
                    &exam_label,
                )?;
                Outcome::Scheduled {
                    upsert: resolve_upsert(events, existing),
                    dropped: Vec::new(),
                }
            }
            Intent::DdayQuery { target, title } => {
                Outcome::Dday(DdayAnswer::new(target, title, now.date()))
            }
            Intent::Unrecognized => Outcome::Unrecognized,
        };

        if let Outcome::Scheduled { upsert, dropped } = &outcome {
            debug!(
                created = upsert.created().count(),
                updated = upsert.updated().count(),
                dropped = dropped.len(),
                "compiled"
            );
        }

        Ok(Compilation {
            tag: parsed.tag,
            outcome,
            memory_fills: parsed.memory_fills,
            proposed_memory,
        })
    }
}

/// Compile with default settings.
pub fn compile(
    text: &str,
    now: NaiveDateTime,
    memory: &MemoryState,
    existing: &[Event],
) -> HaruResult<Compilation> {
    Compiler::default().compile(text, now, memory, existing)
}
