//! Workload distribution.
//!
//! Turns subject allocations and an exam date into dated study blocks over
//! the study window (tomorrow through the day before the exam), plus the
//! exam-day reminder. Hours stay unrounded until they are formatted into a
//! title.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{HaruError, HaruResult};
use crate::event::{Event, Priority};
use crate::settings::PlannerSettings;
use crate::subjects::{AllocationKind, SubjectAllocation};

/// Label used when the caller has no better name for the exam.
pub const DEFAULT_EXAM_LABEL: &str = "Exam";

/// Hours for one subject on one day of the study window.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyBlock {
    pub date: NaiveDate,
    pub subject: String,
    pub hours: f64,
    /// Days from `date` to the exam
    pub days_left: i64,
}

/// Phase of a study plan, by position in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyPhase {
    Concepts,
    Practice,
    Review,
}

impl StudyPhase {
    /// First 60% of the days are concepts, up to 85% practice, then review.
    pub fn for_day(index: u32, total: u32) -> Self {
        let reached = (u64::from(index) + 1) * 100;
        let total = u64::from(total);
        if reached <= total * 60 {
            StudyPhase::Concepts
        } else if reached <= total * 85 {
            StudyPhase::Practice
        } else {
            StudyPhase::Review
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudyPhase::Concepts => "Concepts",
            StudyPhase::Practice => "Practice",
            StudyPhase::Review => "Review",
        }
    }
}

/// Builds study schedules with a fixed set of [`PlannerSettings`].
#[derive(Debug, Clone, Default)]
pub struct Planner {
    settings: PlannerSettings,
}

impl Planner {
    pub fn new(settings: PlannerSettings) -> Self {
        Planner { settings }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Per-day, per-subject hours for the window between `today` and `exam_date`.
    ///
    /// # Errors
    /// `InvalidAllocation` when the allocations are empty, mix kinds, hold a
    /// negative or non-finite value, weigh zero in total, when the budget is
    /// not positive, when the exam is already past or further away than
    /// `max_window_days`, or when absolute hours would have to be spread
    /// over an empty window.
    pub fn allocate(
        &self,
        exam_date: NaiveDate,
        today: NaiveDate,
        allocations: &[SubjectAllocation],
        daily_budget: Option<f64>,
    ) -> HaruResult<Vec<StudyBlock>> {
        let kind = uniform_kind(allocations)?;

        if exam_date < today {
            return Err(HaruError::InvalidAllocation(format!(
                "exam date {exam_date} is before {today}"
            )));
        }

        let days_until = (exam_date - today).num_days();
        if days_until > i64::from(self.settings.max_window_days) {
            return Err(HaruError::InvalidAllocation(format!(
                "exam date {exam_date} is more than {} days away",
                self.settings.max_window_days
            )));
        }

        let window: Vec<NaiveDate> = (1..days_until)
            .map(|offset| today + Duration::days(offset))
            .collect();
        debug!(window = window.len(), ?kind, "distributing study hours");

        let per_day: Vec<f64> = match kind {
            AllocationKind::Weight => {
                let budget = daily_budget.unwrap_or(self.settings.default_daily_budget);
                if !budget.is_finite() || budget <= 0.0 {
                    return Err(HaruError::InvalidAllocation(format!(
                        "daily budget must be positive, got {budget}"
                    )));
                }
                let total: f64 = allocations.iter().map(|a| a.value).sum();
                if total <= 0.0 {
                    return Err(HaruError::InvalidAllocation(
                        "subject weights sum to zero".into(),
                    ));
                }
                allocations
                    .iter()
                    .map(|a| budget * a.value / total)
                    .collect()
            }
            AllocationKind::AbsoluteHours => {
                if window.is_empty() {
                    return Err(HaruError::InvalidAllocation(format!(
                        "no study days before {exam_date} to spread hours over"
                    )));
                }
                let days = window.len() as f64;
                allocations.iter().map(|a| a.value / days).collect()
            }
        };

        Ok(window
            .iter()
            .flat_map(|&date| {
                allocations
                    .iter()
                    .zip(&per_day)
                    .map(move |(allocation, &hours)| StudyBlock {
                        date,
                        subject: allocation.subject.clone(),
                        hours,
                        days_left: (exam_date - date).num_days(),
                    })
            })
            .collect())
    }

    /// Study events for each window day and subject, then the exam-day reminder.
    pub fn distribute(
        &self,
        exam_date: NaiveDate,
        now: NaiveDateTime,
        allocations: &[SubjectAllocation],
        daily_budget: Option<f64>,
        exam_label: &str,
    ) -> HaruResult<Vec<Event>> {
        let blocks = self.allocate(exam_date, now.date(), allocations, daily_budget)?;

        let mut events: Vec<Event> = blocks
            .into_iter()
            .map(|block| {
                let title = format!(
                    "{exam_label} D-{}: {} {:.1}h",
                    block.days_left, block.subject, block.hours
                );
                Event::new(block.date, Some(self.settings.study_block_start), title)
                    .with_tag(Priority::Study)
            })
            .collect();

        events.push(self.exam_reminder(exam_date, exam_label));
        Ok(events)
    }

    pub fn exam_reminder(&self, exam_date: NaiveDate, exam_label: &str) -> Event {
        let title = format!("{exam_label} D-Day ({})", exam_date.format("%Y-%m-%d"));
        Event::new(exam_date, Some(self.settings.exam_reminder_time), title)
            .with_tag(Priority::Exam)
    }

    /// One study block a day starting tomorrow, labelled by phase.
    ///
    /// `days` is clamped to `1..=max_study_days`; a non-positive
    /// `hours_per_day` falls back to the default.
    pub fn study_plan(
        &self,
        goal: &str,
        days: u32,
        hours_per_day: f64,
        now: NaiveDateTime,
    ) -> Vec<Event> {
        let days = days.clamp(1, self.settings.max_study_days.max(1));
        let hours = if hours_per_day.is_finite() && hours_per_day > 0.0 {
            hours_per_day
        } else {
            self.settings.default_study_hours
        };
        debug!(goal, days, hours, "building study plan");

        let start = now.date() + Duration::days(1);
        (0..days)
            .map(|i| {
                let phase = StudyPhase::for_day(i, days);
                let title = format!("Study {goal} - {} ({hours}h)", phase.as_str());
                Event::new(
                    start + Duration::days(i64::from(i)),
                    Some(self.settings.study_block_start),
                    title,
                )
                .with_tag(Priority::Study)
            })
            .collect()
    }
}

/// Distribute with default settings and the default exam label.
pub fn distribute(
    exam_date: NaiveDate,
    now: NaiveDateTime,
    allocations: &[SubjectAllocation],
    daily_budget: Option<f64>,
) -> HaruResult<Vec<Event>> {
    Planner::default().distribute(exam_date, now, allocations, daily_budget, DEFAULT_EXAM_LABEL)
}

fn uniform_kind(allocations: &[SubjectAllocation]) -> HaruResult<AllocationKind> {
    let Some(first) = allocations.first() else {
        return Err(HaruError::InvalidAllocation("no subjects given".into()));
    };

    for allocation in allocations {
        if allocation.kind != first.kind {
            return Err(HaruError::InvalidAllocation(format!(
                "'{}' and '{}' mix weights with hours",
                first.subject, allocation.subject
            )));
        }
        if !allocation.value.is_finite() || allocation.value < 0.0 {
            return Err(HaruError::InvalidAllocation(format!(
                "'{}' has invalid value {}",
                allocation.subject, allocation.value
            )));
        }
    }

    Ok(first.kind)
}
