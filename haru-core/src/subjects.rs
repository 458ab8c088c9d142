//! Subject allocation grammar: `수학 40, 영어 30`, `수학 20시간`, `과목 수학 영어`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ALLOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<name>[A-Za-z가-힣]{1,12})\s*(?P<amount>\d+(?:\.\d+)?)\s*(?P<unit>시간|h|페이지|문제)?",
    )
    .expect("valid regex")
});

static NAME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z가-힣]{1,12}$").expect("valid regex"));

/// Words that are never subject names.
const RESERVED: &[&str] = &[
    "시험", "코딩테스트", "공부", "계획", "일", "월", "시", "분", "시간", "하루", "매일", "오전",
    "오후", "아침", "저녁", "밤", "새벽", "과목",
];

/// Fragments marking a token as part of the request rather than a subject.
const REQUEST_WORDS: &[&str] = &["시험", "코딩테스트", "역산", "배분", "까지", "계획", "공부"];

const MAX_LISTED_SUBJECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationKind {
    /// Relative share of the daily budget
    Weight,
    /// Total hours to spread over the study window
    AbsoluteHours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAllocation {
    pub subject: String,
    pub value: f64,
    pub kind: AllocationKind,
}

impl SubjectAllocation {
    pub fn weight(subject: impl Into<String>, value: f64) -> Self {
        SubjectAllocation {
            subject: subject.into(),
            value,
            kind: AllocationKind::Weight,
        }
    }

    pub fn hours(subject: impl Into<String>, value: f64) -> Self {
        SubjectAllocation {
            subject: subject.into(),
            value,
            kind: AllocationKind::AbsoluteHours,
        }
    }
}

impl fmt::Display for SubjectAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AllocationKind::Weight => write!(f, "{} {}", self.subject, self.value),
            AllocationKind::AbsoluteHours => write!(f, "{} {}h", self.subject, self.value),
        }
    }
}

/// `name amount [unit]` pairs in input order. `시간`/`h` makes an hours
/// allocation, anything else a weight. Repeated names of the same kind are
/// summed into the first occurrence.
pub fn parse_allocations(text: &str) -> Vec<SubjectAllocation> {
    let mut found: Vec<SubjectAllocation> = Vec::new();

    for caps in ALLOCATION.captures_iter(text) {
        let name = &caps["name"];
        if is_reserved(name) {
            continue;
        }

        let unit = caps.name("unit").map(|u| u.as_str());
        if unit.is_none() {
            let Some(whole) = caps.get(0) else { continue };
            // "6월", "20일", "3시": a date or time, not an amount
            let rest = text[whole.end()..].trim_start();
            if rest.starts_with(['월', '일', '시', '분', '주']) {
                continue;
            }
        }

        let Ok(value) = caps["amount"].parse::<f64>() else {
            continue;
        };
        let kind = match unit {
            Some("시간" | "h") => AllocationKind::AbsoluteHours,
            _ => AllocationKind::Weight,
        };

        match found.iter_mut().find(|a| a.subject == name && a.kind == kind) {
            Some(existing) => existing.value += value,
            None => found.push(SubjectAllocation {
                subject: name.to_string(),
                value,
                kind,
            }),
        }
    }

    found
}

/// Subject names listed after `과목` without amounts, at most eight.
pub fn parse_subject_names(text: &str) -> Vec<String> {
    let Some((_, body)) = text.split_once("과목") else {
        return Vec::new();
    };

    body.split(|c: char| c == ',' || c.is_whitespace())
        .map(|tok| tok.trim_matches(|c: char| c == ',' || c == '.'))
        .filter(|tok| NAME_TOKEN.is_match(tok))
        .filter(|tok| !is_reserved(tok) && !REQUEST_WORDS.iter().any(|w| tok.contains(w)))
        .take(MAX_LISTED_SUBJECTS)
        .map(str::to_string)
        .collect()
}

/// Reserved words also block their `에` forms (`하루에`, `매일에`).
fn is_reserved(name: &str) -> bool {
    let stem = name.strip_suffix('에').unwrap_or(name);
    RESERVED.contains(&name) || RESERVED.contains(&stem) || name.eq_ignore_ascii_case("h")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_in_order() {
        let found = parse_allocations("6월 20일 시험까지 수학 40, 영어 30, 국어 30 배분");
        assert_eq!(
            found,
            vec![
                SubjectAllocation::weight("수학", 40.0),
                SubjectAllocation::weight("영어", 30.0),
                SubjectAllocation::weight("국어", 30.0),
            ]
        );
    }

    #[test]
    fn hours_units() {
        let found = parse_allocations("수학 20시간, 영어 12.5h");
        assert_eq!(
            found,
            vec![
                SubjectAllocation::hours("수학", 20.0),
                SubjectAllocation::hours("영어", 12.5),
            ]
        );
    }

    #[test]
    fn pages_and_problems_are_weights() {
        let found = parse_allocations("수학 40문제 영어 10페이지");
        assert!(found.iter().all(|a| a.kind == AllocationKind::Weight));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn reserved_words_and_dates_are_skipped() {
        assert!(parse_allocations("하루 4시간 매일 2시간").is_empty());
        assert_eq!(
            parse_allocations("수학 40 하루에 4시간"),
            vec![SubjectAllocation::weight("수학", 40.0)]
        );
        assert!(parse_allocations("시험 20일 오후 3시").is_empty());
    }

    #[test]
    fn repeated_subject_is_summed() {
        let found = parse_allocations("수학 10, 영어 5, 수학 20");
        assert_eq!(found[0], SubjectAllocation::weight("수학", 30.0));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn mixed_kinds_are_kept_apart() {
        let found = parse_allocations("수학 10시간, 수학 3");
        assert_eq!(found.len(), 2);
        assert_ne!(found[0].kind, found[1].kind);
    }

    #[test]
    fn names_after_subject_marker() {
        assert_eq!(
            parse_subject_names("6월 20일 시험까지 과목 수학 영어, 국어 배분"),
            vec!["수학", "영어", "국어"]
        );
        assert!(parse_subject_names("수학 영어").is_empty());
    }

    #[test]
    fn listed_names_are_capped() {
        let names = parse_subject_names("과목 가 나 다 라 마 바 사 아 자 차");
        assert_eq!(names.len(), 8);
    }
}
