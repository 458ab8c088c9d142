//! Clock time grammar: `오후 1시`, `9시 30분`, `3시 반`, `저녁 7시`.

use std::ops::Range;

use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use super::date::preceded_by_digit;

static CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?P<mer>오전|오후|아침|새벽|저녁|밤)\s*)?(?P<h>\d{1,2})\s*(?P<si>시)(?:\s*(?P<min>\d{1,2})\s*분|\s*(?P<half>반))?",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// A clock expression as written, before any 12h/24h interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockMatch {
    pub span: Range<usize>,
    pub meridiem: Option<Meridiem>,
    pub hour: u32,
    pub minute: u32,
}

impl ClockMatch {
    /// 24-hour time. A bare hour is taken as written (AM for 1-11).
    pub fn to_time(&self) -> NaiveTime {
        let hour = match self.meridiem {
            Some(Meridiem::Pm) if self.hour < 12 => self.hour + 12,
            Some(Meridiem::Am) if self.hour == 12 => 0,
            _ => self.hour,
        };
        NaiveTime::from_hms_opt(hour, self.minute, 0).unwrap_or_default()
    }

    /// Like `to_time`, but a bare hour that does not move forward from the
    /// previous time in the same utterance is read as afternoon
    /// (`9시 면접, 1시 시험` is 09:00 then 13:00).
    pub fn resolve_after(&self, previous: Option<NaiveTime>) -> NaiveTime {
        let time = self.to_time();
        match (self.meridiem, previous) {
            (None, Some(prev)) if (1..12).contains(&self.hour) && self.hour <= prev.hour() => {
                time.with_hour(self.hour + 12).unwrap_or(time)
            }
            _ => time,
        }
    }
}

/// All clock expressions in `text`, in order.
pub fn scan_clock(text: &str) -> Vec<ClockMatch> {
    CLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let si = caps.name("si")?;
            let after_si = &text[si.end()..];

            // "2시간" is a duration, "1시험" an exam
            if after_si.starts_with('간') || after_si.starts_with('험') {
                return None;
            }
            if caps.name("mer").is_none() && preceded_by_digit(text, whole.start()) {
                return None;
            }

            let hour: u32 = caps["h"].parse().ok()?;
            if hour > 23 {
                return None;
            }

            let mut end = whole.end();
            let minute = if let Some(min) = caps.name("min") {
                let minute: u32 = min.as_str().parse().ok()?;
                if minute > 59 {
                    return None;
                }
                minute
            } else if let Some(half) = caps.name("half") {
                // "반드시", "반장" are words, not half past
                if text[half.end()..].chars().next().is_some_and(is_hangul_syllable) {
                    end = si.end();
                    0
                } else {
                    30
                }
            } else {
                0
            };

            let meridiem = caps.name("mer").map(|m| match (m.as_str(), hour) {
                ("밤" | "새벽", 12) | ("밤", 1..=5) => Meridiem::Am,
                ("오전" | "아침" | "새벽", _) => Meridiem::Am,
                _ => Meridiem::Pm,
            });

            Some(ClockMatch {
                span: whole.start()..end,
                meridiem,
                hour,
                minute,
            })
        })
        .collect()
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}
