//! Date expression grammar.
//!
//! Each `DateForm` is a small matcher. `scan_dates` runs them in priority
//! order and keeps the non-overlapping hits, so a `4월 9일` is never also
//! read as a day-only `9일`.

use std::ops::Range;

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HaruError, HaruResult};

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<y>\d{4})[-./](?P<m>\d{1,2})[-./](?P<d>\d{1,2})").expect("valid regex")
});

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<m>\d{1,2})\s*월\s*(?P<d>\d{1,2})\s*일").expect("valid regex")
});

static DAY_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<d>\d{1,2})\s*일").expect("valid regex"));

static RELATIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"오늘|내일|모레").expect("valid regex"));

/// The recognised date shapes, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateForm {
    /// `2026-04-09`, `2026.4.9`, `2026/04/09`
    IsoDate,
    /// `4월 9일`
    MonthDay,
    /// `20일`
    DayOnly,
    /// `오늘`, `내일`, `모레`
    Relative,
}

impl DateForm {
    pub const PRIORITY: [DateForm; 4] = [
        DateForm::IsoDate,
        DateForm::MonthDay,
        DateForm::DayOnly,
        DateForm::Relative,
    ];

    /// Every hit of this single form, ignoring the other forms.
    pub fn find_all(self, text: &str) -> Vec<DateMatch> {
        match self {
            DateForm::IsoDate => ISO_DATE
                .captures_iter(text)
                .filter_map(|caps| {
                    let span = caps.get(0)?.range();
                    Some(DateMatch {
                        span,
                        value: DateValue::Iso {
                            year: caps["y"].parse().ok()?,
                            month: caps["m"].parse().ok()?,
                            day: caps["d"].parse().ok()?,
                        },
                    })
                })
                .collect(),
            DateForm::MonthDay => MONTH_DAY
                .captures_iter(text)
                .filter_map(|caps| {
                    let span = caps.get(0)?.range();
                    Some(DateMatch {
                        span,
                        value: DateValue::MonthDay {
                            month: caps["m"].parse().ok()?,
                            day: caps["d"].parse().ok()?,
                        },
                    })
                })
                .collect(),
            DateForm::DayOnly => DAY_ONLY
                .captures_iter(text)
                .filter_map(|caps| {
                    let span = caps.get(0)?.range();
                    // "120일" is not day 20, and "14일간" is a duration.
                    if preceded_by_digit(text, span.start) || text[span.end..].starts_with('간') {
                        return None;
                    }
                    Some(DateMatch {
                        span,
                        value: DateValue::Day(caps["d"].parse().ok()?),
                    })
                })
                .collect(),
            DateForm::Relative => RELATIVE
                .find_iter(text)
                .map(|m| {
                    let offset = match m.as_str() {
                        "오늘" => 0,
                        "내일" => 1,
                        _ => 2,
                    };
                    DateMatch {
                        span: m.range(),
                        value: DateValue::Relative(offset),
                    }
                })
                .collect(),
        }
    }
}

/// The raw numbers a matcher pulled out, before year/month inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Iso { year: i32, month: u32, day: u32 },
    MonthDay { month: u32, day: u32 },
    Day(u32),
    /// Days from today
    Relative(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// Byte range in the scanned text
    pub span: Range<usize>,
    pub value: DateValue,
}

impl DateMatch {
    pub fn form(&self) -> DateForm {
        match self.value {
            DateValue::Iso { .. } => DateForm::IsoDate,
            DateValue::MonthDay { .. } => DateForm::MonthDay,
            DateValue::Day(_) => DateForm::DayOnly,
            DateValue::Relative(_) => DateForm::Relative,
        }
    }

    /// Turn the match into an absolute date relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> HaruResult<NaiveDate> {
        match self.value {
            DateValue::Iso { year, month, day } => NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| HaruError::InvalidDate(format!("{year}-{month:02}-{day:02}"))),
            DateValue::MonthDay { month, day } => infer_month_day(today, month, day),
            DateValue::Day(day) => infer_day(today, day),
            DateValue::Relative(offset) => Ok(today + Duration::days(offset)),
        }
    }
}

/// All date expressions in `text`, non-overlapping, sorted by position.
/// Higher-priority forms claim their span first.
pub fn scan_dates(text: &str) -> Vec<DateMatch> {
    let mut found: Vec<DateMatch> = Vec::new();

    for form in DateForm::PRIORITY {
        for candidate in form.find_all(text) {
            let overlaps = found
                .iter()
                .any(|m| m.span.start < candidate.span.end && candidate.span.start < m.span.end);
            if !overlaps {
                found.push(candidate);
            }
        }
    }

    found.sort_by_key(|m| m.span.start);
    found
}

/// Month/day without a year: this year if on or after today, otherwise next year.
pub fn infer_month_day(today: NaiveDate, month: u32, day: u32) -> HaruResult<NaiveDate> {
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(candidate) if candidate >= today => Ok(candidate),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            .ok_or_else(|| HaruError::InvalidDate(format!("{month}월 {day}일"))),
    }
}

/// Day-of-month only: this month if the day has not passed, otherwise the
/// next month that has such a day.
pub fn infer_day(today: NaiveDate, day: u32) -> HaruResult<NaiveDate> {
    if day == 0 || day > 31 {
        return Err(HaruError::InvalidDate(format!("{day}일")));
    }

    let mut year = today.year();
    let mut month = today.month();
    for _ in 0..12 {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day)
            && candidate >= today
        {
            return Ok(candidate);
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    Err(HaruError::InvalidDate(format!("{day}일")))
}

pub(crate) fn preceded_by_digit(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn priority_order_is_iso_month_day_relative() {
        assert_eq!(
            DateForm::PRIORITY,
            [
                DateForm::IsoDate,
                DateForm::MonthDay,
                DateForm::DayOnly,
                DateForm::Relative
            ]
        );
    }

    #[test]
    fn month_day_is_not_also_day_only() {
        let found = scan_dates("4월 9일 파이널 프로젝트 발표");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].form(), DateForm::MonthDay);
        assert_eq!(found[0].value, DateValue::MonthDay { month: 4, day: 9 });
    }

    #[test]
    fn iso_separators() {
        for text in ["2026-04-09", "2026.4.9", "2026/04/09"] {
            let found = scan_dates(text);
            assert_eq!(found.len(), 1, "{text}");
            assert_eq!(found[0].resolve(date(2026, 1, 1)).unwrap(), date(2026, 4, 9));
        }
    }

    #[test]
    fn scan_keeps_position_order() {
        let found = scan_dates("내일 회의, 20일 면접");
        let forms: Vec<_> = found.iter().map(|m| m.form()).collect();
        assert_eq!(forms, vec![DateForm::Relative, DateForm::DayOnly]);
    }

    #[test]
    fn day_only_rejects_durations_and_long_numbers() {
        assert!(scan_dates("14일간 공부").is_empty());
        assert!(scan_dates("120일").is_empty());
    }

    #[test]
    fn month_day_rolls_to_next_year() {
        let today = date(2026, 12, 20);
        assert_eq!(infer_month_day(today, 1, 5).unwrap(), date(2027, 1, 5));
        assert_eq!(infer_month_day(today, 12, 20).unwrap(), date(2026, 12, 20));
        assert_eq!(infer_month_day(today, 12, 31).unwrap(), date(2026, 12, 31));
    }

    #[test]
    fn month_day_rejects_impossible_dates() {
        let today = date(2026, 1, 1);
        assert!(matches!(
            infer_month_day(today, 2, 30),
            Err(HaruError::InvalidDate(_))
        ));
        assert!(infer_month_day(today, 13, 1).is_err());
    }

    #[test]
    fn day_only_rolls_to_next_month() {
        let today = date(2026, 4, 15);
        assert_eq!(infer_day(today, 20).unwrap(), date(2026, 4, 20));
        assert_eq!(infer_day(today, 15).unwrap(), date(2026, 4, 15));
        assert_eq!(infer_day(today, 3).unwrap(), date(2026, 5, 3));
    }

    #[test]
    fn day_only_skips_short_months() {
        // April has no 31st
        assert_eq!(infer_day(date(2026, 4, 2), 31).unwrap(), date(2026, 5, 31));
        assert_eq!(infer_day(date(2026, 12, 28), 5).unwrap(), date(2027, 1, 5));
        assert!(infer_day(date(2026, 4, 2), 32).is_err());
    }

    #[test]
    fn relative_words() {
        let today = date(2026, 2, 27);
        let found = scan_dates("모레 치과");
        assert_eq!(found[0].resolve(today).unwrap(), date(2026, 3, 1));
        let found = scan_dates("내일 치과");
        assert_eq!(found[0].resolve(today).unwrap(), date(2026, 2, 28));
    }
}
