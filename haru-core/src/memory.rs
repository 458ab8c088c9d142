//! Conversation memory and the resolver that fills omitted fields from it.
//!
//! The core only reads a [`MemoryState`] snapshot. Fields the user did not
//! state are taken, in order, from the text, then the snapshot, then a hard
//! default; every field taken from the snapshot is recorded so the caller
//! can say so.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::subjects::SubjectAllocation;

/// Values remembered from earlier requests. Owned and persisted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryState {
    pub exam_date: Option<NaiveDate>,
    pub subjects: Vec<String>,
    pub daily_hours: Option<f64>,
    pub study_goal: Option<String>,
    pub study_days: Option<u32>,
}

impl MemoryState {
    pub fn is_empty(&self) -> bool {
        *self == MemoryState::default()
    }
}

impl fmt::Display for MemoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }

        let subjects = if self.subjects.is_empty() {
            "-".to_string()
        } else {
            self.subjects.join(", ")
        };

        writeln!(f, "exam date:   {}", or_dash(self.exam_date))?;
        writeln!(f, "subjects:    {subjects}")?;
        writeln!(f, "daily hours: {}", or_dash(self.daily_hours))?;
        writeln!(f, "study goal:  {}", or_dash(self.study_goal.as_deref()))?;
        write!(f, "study days:  {}", or_dash(self.study_days))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryField {
    ExamDate,
    Subjects,
    DailyHours,
    StudyGoal,
    StudyDays,
}

impl MemoryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryField::ExamDate => "exam date",
            MemoryField::Subjects => "subjects",
            MemoryField::DailyHours => "daily hours",
            MemoryField::StudyGoal => "study goal",
            MemoryField::StudyDays => "study days",
        }
    }
}

impl fmt::Display for MemoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fills omitted fields from a memory snapshot and records which ones it filled.
#[derive(Debug)]
pub struct MemoryResolver<'a> {
    memory: &'a MemoryState,
    today: NaiveDate,
    fills: Vec<MemoryField>,
}

impl<'a> MemoryResolver<'a> {
    pub fn new(memory: &'a MemoryState, today: NaiveDate) -> Self {
        MemoryResolver {
            memory,
            today,
            fills: Vec::new(),
        }
    }

    /// A remembered exam date that has already passed is not used.
    pub fn exam_date(&mut self, explicit: Option<NaiveDate>) -> Option<NaiveDate> {
        let remembered = self.memory.exam_date.filter(|d| *d >= self.today);
        self.fill(MemoryField::ExamDate, explicit, remembered)
    }

    /// An explicit list replaces the remembered one entirely. Remembered
    /// subjects come back with equal weights.
    pub fn allocations(&mut self, explicit: Vec<SubjectAllocation>) -> Vec<SubjectAllocation> {
        if !explicit.is_empty() {
            return explicit;
        }
        if self.memory.subjects.is_empty() {
            return Vec::new();
        }
        self.record(MemoryField::Subjects);
        self.memory
            .subjects
            .iter()
            .map(|s| SubjectAllocation::weight(s.clone(), 1.0))
            .collect()
    }

    pub fn daily_hours(&mut self, explicit: Option<f64>) -> Option<f64> {
        self.fill(MemoryField::DailyHours, explicit, self.memory.daily_hours)
    }

    pub fn study_goal(&mut self, explicit: Option<String>) -> Option<String> {
        let remembered = self.memory.study_goal.clone();
        self.fill(MemoryField::StudyGoal, explicit, remembered)
    }

    pub fn study_days(&mut self, explicit: Option<u32>) -> Option<u32> {
        self.fill(MemoryField::StudyDays, explicit, self.memory.study_days)
    }

    /// Fields that came from memory, in the order they were filled.
    pub fn into_fills(self) -> Vec<MemoryField> {
        self.fills
    }

    fn fill<T>(&mut self, field: MemoryField, explicit: Option<T>, remembered: Option<T>) -> Option<T> {
        if explicit.is_some() {
            return explicit;
        }
        if remembered.is_some() {
            self.record(field);
        }
        remembered
    }

    fn record(&mut self, field: MemoryField) {
        debug!(%field, "filled from memory");
        if !self.fills.contains(&field) {
            self.fills.push(field);
        }
    }
}

/// Fields stated explicitly in one request, to be remembered for the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryUpdate {
    pub exam_date: Option<NaiveDate>,
    pub subjects: Vec<String>,
    pub daily_hours: Option<f64>,
    pub study_goal: Option<String>,
    pub study_days: Option<u32>,
}

impl MemoryUpdate {
    /// `memory` with every stated field replaced.
    pub fn apply_to(&self, memory: &MemoryState) -> MemoryState {
        let mut next = memory.clone();
        if let Some(date) = self.exam_date {
            next.exam_date = Some(date);
        }
        if !self.subjects.is_empty() {
            next.subjects = self.subjects.clone();
        }
        if let Some(hours) = self.daily_hours {
            next.daily_hours = Some(hours);
        }
        if let Some(goal) = &self.study_goal {
            next.study_goal = Some(goal.clone());
        }
        if let Some(days) = self.study_days {
            next.study_days = Some(days);
        }
        next
    }
}
