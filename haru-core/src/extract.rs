//! Event extraction for registration utterances.
//!
//! An utterance is split into clauses, and each clause into anchor groups:
//! a date and/or a clock time sitting next to each other, followed by the
//! title text up to the next group. Dates and times not stated in a clause
//! are carried over from the previous one, left to right.

use std::fmt;
use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::datetime::{
    ClockMatch, DateMatch, check_bare_number, date_for_time, scan_clock, scan_dates,
};
use crate::error::HaruResult;
use crate::event::Event;
use crate::title::normalize_title;

/// Words allowed between a date and a time of the same group.
const JOINERS: &[&str] = &["에", "에는", "의"];

/// One clause of an utterance, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause(String);

impl Clause {
    pub fn new(text: impl Into<String>) -> Self {
        Clause(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split on `,`, `.` and newlines. A `.` between two digits belongs to a
/// number or a dotted date and does not split.
pub fn split_clauses(text: &str) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        let splits = match c {
            ',' | '\n' => true,
            '.' => {
                let digit_before = prev.is_some_and(|p| p.is_ascii_digit());
                let digit_after = chars.peek().is_some_and(|n| n.is_ascii_digit());
                !(digit_before && digit_after)
            }
            _ => false,
        };

        if splits {
            push_clause(&mut clauses, &current);
            current.clear();
        } else {
            current.push(c);
        }
        prev = Some(c);
    }
    push_clause(&mut clauses, &current);

    clauses
}

fn push_clause(clauses: &mut Vec<Clause>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        clauses.push(Clause::new(trimmed));
    }
}

/// Why a clause (or part of one) produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Only date/time tokens and particles were left
    NoUsableTitle,
    /// Nothing in the clause or before it said when
    NoDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedClause {
    pub clause: String,
    pub reason: DropReason,
}

/// Events found in an utterance plus the clauses that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub events: Vec<Event>,
    pub dropped: Vec<DroppedClause>,
}

/// Split `text` into clauses and extract their events.
pub fn extract(text: &str, now: NaiveDateTime) -> HaruResult<Extraction> {
    extract_events(&split_clauses(text), now)
}

/// Extract one event per anchor group across `clauses`.
///
/// # Errors
/// `AmbiguousDate` or `InvalidDate` from any clause fails the whole call.
/// A missing title only drops that clause.
pub fn extract_events(clauses: &[Clause], now: NaiveDateTime) -> HaruResult<Extraction> {
    let mut context = Context::default();
    let mut extraction = Extraction::default();

    for clause in clauses {
        let text = clause.as_str();
        let groups = anchor_groups(text);

        let covered: Vec<Range<usize>> = groups
            .iter()
            .flat_map(|g| {
                g.date
                    .iter()
                    .map(|d| d.span.clone())
                    .chain(g.clock.iter().map(|c| c.span.clone()))
            })
            .collect();
        let has_date = context.date.is_some() || groups.iter().any(|g| g.date.is_some());
        let has_time = groups.iter().any(|g| g.clock.is_some());
        check_bare_number(text, &covered, has_date, has_time)?;

        if groups.is_empty() {
            let Some(date) = context.date else {
                debug!(clause = text, "no date in clause or context");
                extraction.skip(text, DropReason::NoDate);
                continue;
            };
            extraction.push(text, date, context.time, text);
            continue;
        }

        for (i, group) in groups.iter().enumerate() {
            let (date, time) = context.advance(group, now)?;

            let tail_end = groups.get(i + 1).map_or(text.len(), |next| next.span.start);
            let mut raw = String::new();
            if i == 0 {
                raw.push_str(&text[..group.span.start]);
                raw.push(' ');
            }
            raw.push_str(&text[group.span.end..tail_end]);

            extraction.push(text, date, time, &raw);
        }
    }

    Ok(extraction)
}

impl Extraction {
    fn push(&mut self, clause: &str, date: NaiveDate, time: Option<NaiveTime>, raw_title: &str) {
        match normalize_title(raw_title) {
            Some(title) => self.events.push(Event::new(date, time, title)),
            None => {
                debug!(clause, "no usable title");
                self.skip(clause, DropReason::NoUsableTitle);
            }
        }
    }

    fn skip(&mut self, clause: &str, reason: DropReason) {
        self.dropped.push(DroppedClause {
            clause: clause.to_string(),
            reason,
        });
    }
}

/// The date and time carried from one group to the next.
#[derive(Debug, Default)]
struct Context {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

impl Context {
    fn advance(
        &mut self,
        group: &Group,
        now: NaiveDateTime,
    ) -> HaruResult<(NaiveDate, Option<NaiveTime>)> {
        if let Some(date) = &group.date {
            // a new date starts a new day: no time carries over
            self.date = Some(date.resolve(now.date())?);
            self.time = None;
        }

        let time = group.clock.as_ref().map(|c| c.resolve_after(self.time));
        let date = match (self.date, time) {
            (Some(date), _) => date,
            (None, Some(time)) => date_for_time(now, time),
            // groups always hold a date or a clock
            (None, None) => now.date(),
        };

        self.date = Some(date);
        self.time = time;
        Ok((date, time))
    }
}

/// A date and/or clock time written next to each other.
#[derive(Debug)]
struct Group {
    span: Range<usize>,
    date: Option<DateMatch>,
    clock: Option<ClockMatch>,
}

fn anchor_groups(text: &str) -> Vec<Group> {
    enum Anchor {
        Date(DateMatch),
        Clock(ClockMatch),
    }

    let mut anchors: Vec<(Range<usize>, Anchor)> = scan_dates(text)
        .into_iter()
        .map(|d| (d.span.clone(), Anchor::Date(d)))
        .chain(
            scan_clock(text)
                .into_iter()
                .map(|c| (c.span.clone(), Anchor::Clock(c))),
        )
        .collect();
    anchors.sort_by_key(|(span, _)| span.start);

    let mut groups: Vec<Group> = Vec::new();
    for (span, anchor) in anchors {
        if let Some(last) = groups.last_mut()
            && is_joined(&text[last.span.end.min(span.start)..span.start])
        {
            let slot_free = match &anchor {
                Anchor::Date(_) => last.date.is_none(),
                Anchor::Clock(_) => last.clock.is_none(),
            };
            if slot_free {
                last.span.end = span.end;
                match anchor {
                    Anchor::Date(d) => last.date = Some(d),
                    Anchor::Clock(c) => last.clock = Some(c),
                }
                continue;
            }
        }

        let (date, clock) = match anchor {
            Anchor::Date(d) => (Some(d), None),
            Anchor::Clock(c) => (None, Some(c)),
        };
        groups.push(Group { span, date, clock });
    }

    groups
}

fn is_joined(gap: &str) -> bool {
    let gap = gap.trim();
    gap.is_empty() || JOINERS.contains(&gap)
}
