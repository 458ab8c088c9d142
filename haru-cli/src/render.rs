//! Terminal rendering for haru-core types.
//!
//! Extension traits that add colored output using owo_colors.

use chrono::NaiveDate;
use haru_core::extract::{DropReason, DroppedClause};
use haru_core::{
    Compilation, DdayAnswer, HaruError, MemoryField, Outcome, Priority, UpsertEntry, UpsertKind,
    dday_label,
};
use owo_colors::OwoColorize;

use crate::store::StoredEvent;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for UpsertKind {
    fn render(&self) -> String {
        let symbol = self.to_string();
        match self {
            UpsertKind::Created => symbol.green().to_string(),
            UpsertKind::Updated => symbol.yellow().to_string(),
        }
    }
}

impl Render for Priority {
    fn render(&self) -> String {
        let label = format!("[{}]", self.as_str());
        match self {
            Priority::Exam => label.red().to_string(),
            Priority::Interview => label.magenta().to_string(),
            Priority::Study => label.cyan().to_string(),
            Priority::Normal => label.dimmed().to_string(),
        }
    }
}

impl Render for UpsertEntry {
    fn render(&self) -> String {
        let event = &self.event;
        let summary = match self.kind {
            UpsertKind::Created => event.title.green().to_string(),
            UpsertKind::Updated => event.title.yellow().to_string(),
        };

        let mut line = format!(
            "{} {} {:>7} {} {}",
            self.kind.render(),
            event.date.format("%Y-%m-%d"),
            event.time_label(),
            summary,
            event.tag.render()
        );
        if let Some(previous) = &self.previous
            && previous.time != event.time
        {
            let change = format!("({} → {})", previous.time_label(), event.time_label());
            line.push_str(&format!(" {}", change.dimmed()));
        }
        line
    }
}

impl Render for DdayAnswer {
    fn render(&self) -> String {
        let label = self.label();
        let label = if self.days_left > 0 {
            label.bold().to_string()
        } else {
            label.red().bold().to_string()
        };
        format!("{label} {self}")
    }
}

impl Render for DroppedClause {
    fn render(&self) -> String {
        let reason = match self.reason {
            DropReason::NoUsableTitle => "no title",
            DropReason::NoDate => "no date",
        };
        format!("{} {} {}", "!".yellow(), self.clause, format!("({reason})").dimmed())
    }
}

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 12;

/// Everything a compilation has to say, one line per entry.
pub fn render_compilation(compilation: &Compilation, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if compilation.used_memory() {
        lines.push(render_memory_fills(&compilation.memory_fills));
    }

    match &compilation.outcome {
        Outcome::Scheduled { upsert, dropped } => {
            if upsert.report.is_empty() {
                lines.push("No events found".dimmed().to_string());
            } else if verbose || upsert.report.len() <= COMPACT_THRESHOLD {
                lines.extend(upsert.report.iter().map(|e| format!("  {}", e.render())));
            } else {
                let created = upsert.created().count();
                let updated = upsert.updated().count();
                if let (Some(first), Some(last)) = (upsert.report.first(), upsert.report.last()) {
                    lines.push(format!(
                        "  {} → {}",
                        first.event.date.format("%Y-%m-%d"),
                        last.event.date.format("%Y-%m-%d")
                    ));
                }
                if created > 0 {
                    let label = format!("({created} new {})", pluralize("event", created));
                    lines.push(format!("  {} {}", "+".green(), label.green()));
                }
                if updated > 0 {
                    let label = format!("({updated} changed {})", pluralize("event", updated));
                    lines.push(format!("  {} {}", "~".yellow(), label.yellow()));
                }
            }
            lines.extend(dropped.iter().map(|d| format!("  {}", d.render())));
        }
        Outcome::Dday(answer) => lines.push(format!("  {}", answer.render())),
        Outcome::Unrecognized => lines.push(
            "Nothing to schedule. Try \"20일 9시 면접\" or type help."
                .dimmed()
                .to_string(),
        ),
    }

    lines
}

pub fn render_memory_fills(fields: &[MemoryField]) -> String {
    let names: Vec<_> = fields.iter().map(MemoryField::as_str).collect();
    format!("(using memory: {})", names.join(", ")).dimmed().to_string()
}

/// A compile error, phrased as a request for clarification where possible.
pub fn render_error(error: &HaruError) -> String {
    let hint = match error {
        HaruError::AmbiguousDate { .. } => {
            " Add a unit, e.g. \"20일\" for a day or \"9시\" for a time."
        }
        HaruError::MissingExamDate => " Add the exam date, e.g. \"6월 20일 시험까지\".",
        HaruError::InvalidAllocation(_) | HaruError::InvalidDate(_) => "",
    };
    format!("{}{}", error.to_string().red(), hint.dimmed())
}

/// Stored events grouped by day, with D-day labels.
pub fn render_event_list(events: &[StoredEvent], today: NaiveDate) -> Vec<String> {
    if events.is_empty() {
        return vec!["No events found".dimmed().to_string()];
    }

    let mut lines = Vec::new();
    let mut current_date: Option<NaiveDate> = None;

    for stored in events {
        let event = &stored.event;
        if current_date != Some(event.date) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            let heading = format!(
                "{} {}",
                format_date_label(event.date, today),
                dday_label(event.date, today)
            );
            lines.push(heading.bold().to_string());
            current_date = Some(event.date);
        }

        let id = format!("#{}", stored.id);
        lines.push(format!(
            "  {:>5} {:>7} {} {}",
            id.dimmed(),
            event.time_label(),
            event.title,
            event.tag.render()
        ));
    }

    lines
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use haru_core::Event;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_labels() {
        let today = date(2026, 4, 1);
        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(date(2026, 4, 2), today), "Tomorrow");
        assert_eq!(format_date_label(date(2026, 4, 9), today), "Thu Apr 9 2026");
    }

    #[test]
    fn event_list_groups_by_day() {
        let today = date(2026, 4, 1);
        let events = vec![
            StoredEvent {
                id: 1,
                event: Event::new(date(2026, 4, 9), None, "발표"),
            },
            StoredEvent {
                id: 2,
                event: Event::new(date(2026, 4, 9), None, "회의"),
            },
            StoredEvent {
                id: 3,
                event: Event::new(date(2026, 4, 10), None, "면접"),
            },
        ];

        let lines = render_event_list(&events, today);
        // two headings, three events, one spacer
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("D-8"));
        assert!(lines[3].is_empty());
    }

    #[test]
    fn empty_list() {
        let lines = render_event_list(&[], date(2026, 4, 1));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("No events found"));
    }

    #[test]
    fn plurals() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("event", 3), "events");
    }
}
