//! Date/time normalization.
//!
//! Turns the temporal part of a text span into an absolute date and an
//! optional clock time, relative to a caller-supplied Reference-Now. The
//! grammar lives in `date` (date shapes, in priority order) and `clock`
//! (clock times); this module merges their partial results and owns the
//! ambiguity checks.

pub mod clock;
pub mod date;

use std::ops::Range;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{HaruError, HaruResult};

pub use clock::{ClockMatch, Meridiem, scan_clock};
pub use date::{DateForm, DateMatch, DateValue, infer_day, infer_month_day, scan_dates};

/// Words that only carry temporal meaning and may sit among date/time tokens.
const TEMPORAL_FILLERS: &[&str] = &["오전", "오후", "아침", "새벽", "저녁", "밤", "에", "에는"];

/// The result of normalizing a span.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub date: NaiveDate,
    /// None means all-day
    pub time: Option<NaiveTime>,
    /// Text left over once the chosen date/time tokens are removed
    pub remainder: String,
    /// Which date shape was used, None when the date came from a time alone
    pub form: Option<DateForm>,
}

/// Normalize the date/time expressed in `text`.
///
/// Returns `Ok(None)` when the text holds no date or time at all.
///
/// # Errors
/// - `AmbiguousDate` when two same-priority date expressions disagree, or
///   when a bare number could be read as either a day or an hour.
/// - `InvalidDate` when a recognised expression names a day that does not exist.
pub fn normalize(text: &str, now: NaiveDateTime) -> HaruResult<Option<Normalized>> {
    let today = now.date();
    let dates = scan_dates(text);
    let clocks = scan_clock(text);

    let chosen = choose_date(text, &dates, today)?;
    let clock = clocks.first();

    let covered: Vec<Range<usize>> = dates
        .iter()
        .map(|m| m.span.clone())
        .chain(clocks.iter().map(|m| m.span.clone()))
        .collect();
    check_bare_number(text, &covered, chosen.is_some(), clock.is_some())?;

    let time = clock.map(ClockMatch::to_time);

    let (date, form, mut consumed) = match (chosen, time) {
        (Some((date, form, spans)), _) => (date, Some(form), spans),
        (None, Some(time)) => (date_for_time(now, time), None, Vec::new()),
        (None, None) => return Ok(None),
    };
    if let Some(clock) = clock {
        consumed.push(clock.span.clone());
    }

    Ok(Some(Normalized {
        date,
        time,
        remainder: strip_spans(text, &consumed),
        form,
    }))
}

/// Whether `text` carries anything the normalizer would act on, including a
/// bare number that would need disambiguation.
pub fn has_temporal_hint(text: &str) -> bool {
    let dates = scan_dates(text);
    let clocks = scan_clock(text);
    if !dates.is_empty() || !clocks.is_empty() {
        return true;
    }
    leading_bare_number(text, &[]).is_some_and(|n| (1..=24).contains(&n))
}

/// Pick the date from the highest-priority form present. Several hits of
/// that form must agree.
fn choose_date(
    text: &str,
    dates: &[DateMatch],
    today: NaiveDate,
) -> HaruResult<Option<(NaiveDate, DateForm, Vec<Range<usize>>)>> {
    let Some(best) = dates.iter().map(DateMatch::form).min() else {
        return Ok(None);
    };

    let mut resolved: Option<NaiveDate> = None;
    let mut spans = Vec::new();
    for m in dates.iter().filter(|m| m.form() == best) {
        let date = m.resolve(today)?;
        match resolved {
            Some(first) if first != date => {
                return Err(HaruError::ambiguous(
                    text,
                    format!("{first} and {date} are both given as {best:?}"),
                ));
            }
            _ => resolved = Some(date),
        }
        spans.push(m.span.clone());
    }

    Ok(resolved.map(|date| (date, best, spans)))
}

/// A time with no date means the next occurrence of that time.
pub(crate) fn date_for_time(now: NaiveDateTime, time: NaiveTime) -> NaiveDate {
    if time > now.time() {
        now.date()
    } else {
        now.date() + Duration::days(1)
    }
}

/// Reject a leading number with no unit when it could fill a missing day or
/// hour. `covered` lists the spans already claimed by date/time matches.
pub(crate) fn check_bare_number(
    text: &str,
    covered: &[Range<usize>],
    has_date: bool,
    has_time: bool,
) -> HaruResult<()> {
    let Some(n) = leading_bare_number(text, covered) else {
        return Ok(());
    };

    let reason = match (has_date, has_time) {
        (true, true) => return Ok(()),
        (true, false) if n <= 24 => format!("'{n}' could be an hour"),
        (false, true) if (1..=31).contains(&n) => format!("'{n}' could be a day"),
        (false, false) if (1..=24).contains(&n) => format!("'{n}' could be a day or an hour"),
        _ => return Ok(()),
    };
    Err(HaruError::ambiguous(text, reason))
}

/// The first whitespace token that is not part of a date/time expression,
/// if it is a plain 1-2 digit number.
fn leading_bare_number(text: &str, covered: &[Range<usize>]) -> Option<u32> {
    for (start, token) in tokens(text) {
        let end = start + token.len();
        let is_covered = covered.iter().any(|s| s.start <= start && end <= s.end);
        if is_covered || TEMPORAL_FILLERS.contains(&token) {
            continue;
        }
        if token.len() <= 2 && token.chars().all(|c| c.is_ascii_digit()) {
            return token.parse().ok();
        }
        return None;
    }
    None
}

/// Whitespace-separated tokens with their byte offsets.
fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_whitespace().map(move |token| {
        let start = token.as_ptr() as usize - text.as_ptr() as usize;
        (start, token)
    })
}

/// Remove the given byte spans and collapse whitespace.
pub(crate) fn strip_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut sorted: Vec<&Range<usize>> = spans.iter().collect();
    sorted.sort_by_key(|s| s.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in sorted {
        if span.start < cursor {
            continue;
        }
        out.push_str(&text[cursor..span.start]);
        out.push(' ');
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn month_day_with_pm_time() {
        let n = normalize("4월 9일 오후 1시 파이널 프로젝트 발표", now(2026, 3, 1, 10))
            .unwrap()
            .unwrap();
        assert_eq!(n.date, date(2026, 4, 9));
        assert_eq!(n.time, Some(hm(13, 0)));
        assert_eq!(n.remainder, "파이널 프로젝트 발표");
        assert_eq!(n.form, Some(DateForm::MonthDay));
    }

    #[test]
    fn date_without_time_is_all_day() {
        let n = normalize("2026-04-09 발표", now(2026, 3, 1, 10)).unwrap().unwrap();
        assert_eq!(n.date, date(2026, 4, 9));
        assert_eq!(n.time, None);
        assert_eq!(n.remainder, "발표");
    }

    #[test]
    fn year_rollover() {
        let n = normalize("1월 5일 면접", now(2026, 12, 20, 9)).unwrap().unwrap();
        assert_eq!(n.date, date(2027, 1, 5));
    }

    #[test]
    fn iso_outranks_day_only() {
        let n = normalize("2026-05-01 마감, 20일 확인", now(2026, 4, 1, 9))
            .unwrap()
            .unwrap();
        assert_eq!(n.date, date(2026, 5, 1));
        assert_eq!(n.form, Some(DateForm::IsoDate));
    }

    #[test]
    fn relative_dates() {
        let n = normalize("내일 오전 10시 치과", now(2026, 4, 30, 9)).unwrap().unwrap();
        assert_eq!(n.date, date(2026, 5, 1));
        assert_eq!(n.time, Some(hm(10, 0)));
        assert_eq!(n.remainder, "치과");
    }

    #[test]
    fn time_only_uses_next_occurrence() {
        let later = normalize("오후 3시 회의", now(2026, 4, 1, 9)).unwrap().unwrap();
        assert_eq!(later.date, date(2026, 4, 1));
        assert_eq!(later.form, None);

        let passed = normalize("오전 8시 회의", now(2026, 4, 1, 9)).unwrap().unwrap();
        assert_eq!(passed.date, date(2026, 4, 2));
    }

    #[test]
    fn nothing_temporal() {
        assert_eq!(normalize("그냥 메모", now(2026, 4, 1, 9)).unwrap(), None);
    }

    #[test]
    fn conflicting_same_form_dates_are_ambiguous() {
        let err = normalize("4월 9일 4월 10일 발표", now(2026, 3, 1, 9)).unwrap_err();
        assert!(matches!(err, HaruError::AmbiguousDate { .. }));
    }

    #[test]
    fn repeated_equal_dates_are_fine() {
        let n = normalize("4월 9일 발표, 4월 9일 준비", now(2026, 3, 1, 9)).unwrap().unwrap();
        assert_eq!(n.date, date(2026, 4, 9));
        assert_eq!(n.remainder, "발표, 준비");
    }

    #[test]
    fn bare_number_is_ambiguous() {
        let at = now(2026, 4, 1, 9);
        assert!(matches!(
            normalize("20 면접", at),
            Err(HaruError::AmbiguousDate { .. })
        ));
        // date present, number could be the hour
        assert!(matches!(
            normalize("4월 9일 3 발표", at),
            Err(HaruError::AmbiguousDate { .. })
        ));
        // time present, number could be the day
        assert!(matches!(
            normalize("오후 3시 20 회의", at),
            Err(HaruError::AmbiguousDate { .. })
        ));
    }

    #[test]
    fn bare_number_after_title_is_not_temporal() {
        let n = normalize("4월 9일 수학 40 문제", now(2026, 3, 1, 9)).unwrap().unwrap();
        assert_eq!(n.remainder, "수학 40 문제");
    }

    #[test]
    fn fully_specified_ignores_extra_number() {
        let n = normalize("4월 9일 오후 1시 2 차 면접", now(2026, 3, 1, 9));
        assert!(n.is_ok());
    }

    #[test]
    fn invalid_date_is_reported() {
        assert!(matches!(
            normalize("2월 30일 약속", now(2026, 1, 1, 9)),
            Err(HaruError::InvalidDate(_))
        ));
    }

    #[test]
    fn temporal_hint() {
        assert!(has_temporal_hint("20일 면접"));
        assert!(has_temporal_hint("3시 회의"));
        assert!(has_temporal_hint("20 면접"));
        assert!(!has_temporal_hint("면접 준비"));
        assert!(!has_temporal_hint("수학 40"));
    }

    #[test]
    fn strip_spans_collapses_whitespace() {
        let text = "20일 9시 면접";
        let spans = vec![0.."20일".len(), "20일 ".len().."20일 9시".len()];
        assert_eq!(strip_spans(text, &spans), "면접");
    }
}
