//! Schedule event types.
//!
//! An `Event` is what the compiler hands to the storage collaborator: a date,
//! an optional clock time (absent means all-day), a cleaned title and a
//! priority tag used for rendering.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::title::title_key;

/// A schedule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub date: NaiveDate,
    /// None means the event is all-day
    pub time: Option<NaiveTime>,
    pub title: String,
    pub tag: Priority,
}

/// Priority category, derived from title keywords unless set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Exam,
    Interview,
    Study,
    Normal,
}

impl Priority {
    /// Classify a title by keyword. Exam wins over interview, interview over study.
    pub fn for_title(title: &str) -> Self {
        let lowered = title.to_lowercase();

        if title.contains("시험")
            || title.contains("코딩테스트")
            || lowered.contains("exam")
            || lowered.contains("test")
        {
            return Priority::Exam;
        }
        if title.contains("면접") || lowered.contains("interview") {
            return Priority::Interview;
        }
        if title.contains("공부") || lowered.contains("study") {
            return Priority::Study;
        }
        Priority::Normal
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Exam => "exam",
            Priority::Interview => "interview",
            Priority::Study => "study",
            Priority::Normal => "normal",
        }
    }
}

impl Event {
    /// Create an event, deriving the tag from the title.
    pub fn new(date: NaiveDate, time: Option<NaiveTime>, title: impl Into<String>) -> Self {
        let title = title.into();
        let tag = Priority::for_title(&title);
        Event {
            date,
            time,
            title,
            tag,
        }
    }

    pub fn with_tag(mut self, tag: Priority) -> Self {
        self.tag = tag;
        self
    }

    /// Dedup key: (date, normalized title).
    pub fn key(&self) -> (NaiveDate, String) {
        (self.date, title_key(&self.title))
    }

    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    /// Clock time rendered as `HH:MM`, or `all-day`.
    pub fn time_label(&self) -> String {
        match self.time {
            Some(t) => t.format("%H:%M").to_string(),
            None => "all-day".to_string(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} | {}",
            self.date.format("%Y-%m-%d"),
            self.time_label(),
            self.title
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn priority_from_korean_keywords() {
        assert_eq!(Priority::for_title("중간 시험"), Priority::Exam);
        assert_eq!(Priority::for_title("카카오 코딩테스트"), Priority::Exam);
        assert_eq!(Priority::for_title("면접"), Priority::Interview);
        assert_eq!(Priority::for_title("영어 공부"), Priority::Study);
        assert_eq!(Priority::for_title("동아리 모임"), Priority::Normal);
    }

    #[test]
    fn priority_exam_outranks_study() {
        assert_eq!(Priority::for_title("시험 공부"), Priority::Exam);
        assert_eq!(Priority::for_title("Study for EXAM"), Priority::Exam);
    }

    #[test]
    fn key_folds_spacing_and_case() {
        let a = Event::new(date(2026, 4, 9), None, "파이널 프로젝트 발표");
        let b = Event::new(date(2026, 4, 9), None, "파이널프로젝트  발표");
        assert_eq!(a.key(), b.key());

        let c = Event::new(date(2026, 4, 9), None, "Team Sync");
        let d = Event::new(date(2026, 4, 9), None, "team-sync");
        assert_eq!(c.key(), d.key());
    }

    #[test]
    fn display_all_day_and_timed() {
        let all_day = Event::new(date(2026, 4, 9), None, "발표");
        assert_eq!(all_day.to_string(), "2026-04-09 all-day | 발표");

        let timed = Event::new(date(2026, 4, 9), NaiveTime::from_hms_opt(13, 0, 0), "발표");
        assert_eq!(timed.to_string(), "2026-04-09 13:00 | 발표");
    }
}
