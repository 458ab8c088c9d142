//! Intent parsing: classification plus per-intent field extraction, with
//! omitted fields filled from memory.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::classify::{IntentTag, classify};
use crate::datetime::{DateForm, normalize, scan_dates};
use crate::error::{HaruError, HaruResult};
use crate::extract::{Clause, split_clauses};
use crate::memory::{MemoryField, MemoryResolver, MemoryState, MemoryUpdate};
use crate::settings::PlannerSettings;
use crate::subjects::{SubjectAllocation, parse_allocations, parse_subject_names};
use crate::title::normalize_title;

static STUDY_GOAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\s,\.]+(?:\s+[^\s,\.]+)?)\s*공부").expect("valid regex"));

static STUDY_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<n>\d{1,3})\s*(?P<unit>일간|일|주)").expect("valid regex"));

static HOURS_PER_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:하루|매일)\s*에?\s*)?(?P<h>\d+(?:\.\d+)?)\s*시간").expect("valid regex")
});

static DAILY_BUDGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:하루|매일)\s*에?\s*(?P<h>\d+(?:\.\d+)?)\s*(?:시간|h)").expect("valid regex")
});

static DDAY_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)까지|며칠|몇\s*일|남았\S*|남음|언제|d-day|디데이|[?？]").expect("valid regex")
});

/// Exam names recognised in distribution requests, most specific first.
const EXAM_LABELS: &[&str] = &["코딩테스트", "중간고사", "기말고사", "시험"];

const DEFAULT_EXAM_LABEL: &str = "시험";
const DEFAULT_STUDY_GOAL: &str = "General";
const DEFAULT_SUBJECT: &str = "General";

/// Tokens around `공부` that are not part of a goal name.
const GOAL_NOISE: &[&str] = &["하루", "매일", "매주", "동안", "계획"];

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    RegisterEvents(Vec<Clause>),
    DdayQuery {
        target: NaiveDate,
        title: Option<String>,
    },
    StudyPlan {
        subject: String,
        days: u32,
        hours_per_day: f64,
    },
    ExamDistribution {
        exam_date: NaiveDate,
        exam_label: String,
        allocations: Vec<SubjectAllocation>,
        /// None lets the engine use its default budget
        daily_hours: Option<f64>,
    },
    Unrecognized,
}

/// The result of [`parse_intent`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIntent {
    pub tag: IntentTag,
    pub intent: Intent,
    /// Fields taken from memory rather than the text
    pub memory_fills: Vec<MemoryField>,
    /// The memory snapshot with this request's explicit fields applied
    pub proposed_memory: MemoryState,
}

impl ParsedIntent {
    pub fn used_memory(&self) -> bool {
        !self.memory_fills.is_empty()
    }
}

/// Parse `text` with default planner settings.
pub fn parse_intent(
    text: &str,
    now: NaiveDateTime,
    memory: &MemoryState,
) -> HaruResult<ParsedIntent> {
    parse_intent_with(text, now, memory, &PlannerSettings::default())
}

/// Classify `text` and build its intent, filling omissions from `memory`.
///
/// # Errors
/// - `AmbiguousDate` / `InvalidDate` from the date normalizer.
/// - `MissingExamDate` for a distribution request with no usable exam date.
pub fn parse_intent_with(
    text: &str,
    now: NaiveDateTime,
    memory: &MemoryState,
    settings: &PlannerSettings,
) -> HaruResult<ParsedIntent> {
    let tag = classify(text);
    let mut resolver = MemoryResolver::new(memory, now.date());
    let mut update = MemoryUpdate::default();

    let intent = match tag {
        IntentTag::ExamDistribution => {
            let exam_date = explicit_date(text, now)?;
            let explicit_allocations = subject_allocations(text);
            let daily_hours = capture_hours(&DAILY_BUDGET, text);

            update.exam_date = exam_date;
            update.subjects = explicit_allocations
                .iter()
                .map(|a| a.subject.clone())
                .collect();
            update.daily_hours = daily_hours;

            let exam_date = resolver
                .exam_date(exam_date)
                .ok_or(HaruError::MissingExamDate)?;
            let mut allocations = resolver.allocations(explicit_allocations);
            if allocations.is_empty() {
                allocations.push(SubjectAllocation::weight(DEFAULT_SUBJECT, 1.0));
            }

            Intent::ExamDistribution {
                exam_date,
                exam_label: exam_label(text).to_string(),
                allocations,
                daily_hours: resolver.daily_hours(daily_hours),
            }
        }
        IntentTag::StudyPlan => {
            let goal = study_goal(text);
            let days = study_days(text);
            let hours = capture_hours(&HOURS_PER_DAY, text);

            update.study_goal = goal.clone();
            update.study_days = days;
            update.daily_hours = hours;

            let days = resolver
                .study_days(days)
                .unwrap_or(settings.default_study_days)
                .clamp(1, settings.max_study_days.max(1));

            Intent::StudyPlan {
                subject: resolver
                    .study_goal(goal)
                    .unwrap_or_else(|| DEFAULT_STUDY_GOAL.to_string()),
                days,
                hours_per_day: resolver
                    .daily_hours(hours)
                    .unwrap_or(settings.default_study_hours),
            }
        }
        IntentTag::DdayQuery => {
            let explicit = explicit_date(text, now)?;
            let about_exam = mentions_exam(text);
            if about_exam {
                update.exam_date = explicit;
            }

            let target = if about_exam {
                resolver.exam_date(explicit)
            } else {
                explicit
            };

            match target {
                Some(target) => Intent::DdayQuery {
                    target,
                    title: dday_title(text, now)?,
                },
                None => {
                    debug!("d-day query without a target date");
                    Intent::Unrecognized
                }
            }
        }
        IntentTag::RegisterEvents => Intent::RegisterEvents(split_clauses(text)),
        IntentTag::Unrecognized => Intent::Unrecognized,
    };

    Ok(ParsedIntent {
        tag,
        intent,
        memory_fills: resolver.into_fills(),
        proposed_memory: update.apply_to(memory),
    })
}

/// A date written in the text. A lone clock time does not count.
fn explicit_date(text: &str, now: NaiveDateTime) -> HaruResult<Option<NaiveDate>> {
    Ok(normalize(text, now)?
        .filter(|n| n.form.is_some())
        .map(|n| n.date))
}

fn subject_allocations(text: &str) -> Vec<SubjectAllocation> {
    let allocations = parse_allocations(text);
    if !allocations.is_empty() {
        return allocations;
    }
    parse_subject_names(text)
        .into_iter()
        .map(|name| SubjectAllocation::weight(name, 1.0))
        .collect()
}

fn exam_label(text: &str) -> &'static str {
    EXAM_LABELS
        .iter()
        .find(|label| text.contains(*label))
        .copied()
        .unwrap_or(DEFAULT_EXAM_LABEL)
}

fn mentions_exam(text: &str) -> bool {
    text.contains("시험")
        || text.contains("코딩테스트")
        || text.contains("고사")
        || text.to_lowercase().contains("exam")
}

fn study_goal(text: &str) -> Option<String> {
    let caps = STUDY_GOAL.captures(text)?;
    let goal = caps[1]
        .split_whitespace()
        .filter(|tok| !tok.chars().any(|c| c.is_ascii_digit()) && !GOAL_NOISE.contains(tok))
        .collect::<Vec<_>>()
        .join(" ");
    (!goal.is_empty()).then_some(goal)
}

/// `N일`, `N일간` or `N주` (weeks). The day of a written date (`6월 9일`)
/// is not a duration.
fn study_days(text: &str) -> Option<u32> {
    let dates: Vec<_> = scan_dates(text)
        .into_iter()
        .filter(|m| matches!(m.form(), DateForm::MonthDay | DateForm::IsoDate))
        .map(|m| m.span)
        .collect();

    let caps = STUDY_DAYS.captures_iter(text).find(|caps| {
        caps.get(0).is_some_and(|whole| {
            !dates
                .iter()
                .any(|span| whole.start() < span.end && span.start < whole.end())
        })
    })?;
    let n: u32 = caps["n"].parse().ok()?;
    let days = if &caps["unit"] == "주" { n * 7 } else { n };
    (days > 0).then_some(days)
}

fn capture_hours(pattern: &Regex, text: &str) -> Option<f64> {
    let value: f64 = pattern.captures(text)?["h"].parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// What the query is about, with the date and question words removed.
fn dday_title(text: &str, now: NaiveDateTime) -> HaruResult<Option<String>> {
    let remainder = match normalize(text, now)? {
        Some(normalized) => normalized.remainder,
        None => text.to_string(),
    };
    Ok(normalize_title(&DDAY_WORDS.replace_all(&remainder, " ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subjects::AllocationKind;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(text: &str) -> ParsedIntent {
        parse_intent(text, now(), &MemoryState::default()).unwrap()
    }

    #[test]
    fn registration_keeps_clauses() {
        let parsed = parse("20일 9시 면접, 1시 시험");
        assert_eq!(parsed.tag, IntentTag::RegisterEvents);
        let Intent::RegisterEvents(clauses) = parsed.intent else {
            panic!("expected registration");
        };
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn distribution_fields() {
        let parsed = parse("6월 20일 기말고사까지 수학 40, 영어 30 하루 4시간 배분");
        assert_eq!(
            parsed.intent,
            Intent::ExamDistribution {
                exam_date: date(2026, 6, 20),
                exam_label: "기말고사".into(),
                allocations: vec![
                    SubjectAllocation::weight("수학", 40.0),
                    SubjectAllocation::weight("영어", 30.0),
                ],
                daily_hours: Some(4.0),
            }
        );
        assert!(!parsed.used_memory());
        assert_eq!(parsed.proposed_memory.exam_date, Some(date(2026, 6, 20)));
        assert_eq!(parsed.proposed_memory.subjects, vec!["수학", "영어"]);
    }

    #[test]
    fn daily_budget_with_particle() {
        let parsed = parse("6월 20일 시험까지 수학 40, 영어 30 하루에 4시간 배분");
        let Intent::ExamDistribution {
            allocations,
            daily_hours,
            ..
        } = parsed.intent
        else {
            panic!("expected distribution");
        };
        assert_eq!(
            allocations,
            vec![
                SubjectAllocation::weight("수학", 40.0),
                SubjectAllocation::weight("영어", 30.0),
            ]
        );
        assert_eq!(daily_hours, Some(4.0));
    }

    #[test]
    fn distribution_hours_are_not_the_daily_budget() {
        let parsed = parse("6월 10일 시험까지 수학 20시간 역산");
        let Intent::ExamDistribution {
            allocations,
            daily_hours,
            ..
        } = parsed.intent
        else {
            panic!("expected distribution");
        };
        assert_eq!(allocations[0].kind, AllocationKind::AbsoluteHours);
        assert_eq!(daily_hours, None);
    }

    #[test]
    fn distribution_without_exam_date_needs_memory() {
        let err = parse_intent("수학 40 영어 30 배분", now(), &MemoryState::default()).unwrap_err();
        assert_eq!(err, HaruError::MissingExamDate);

        let memory = MemoryState {
            exam_date: Some(date(2026, 6, 20)),
            subjects: vec!["국어".into()],
            daily_hours: Some(5.0),
            ..MemoryState::default()
        };
        let parsed = parse_intent("시험까지 역산해줘", now(), &memory).unwrap();
        assert_eq!(
            parsed.intent,
            Intent::ExamDistribution {
                exam_date: date(2026, 6, 20),
                exam_label: "시험".into(),
                allocations: vec![SubjectAllocation::weight("국어", 1.0)],
                daily_hours: Some(5.0),
            }
        );
        assert_eq!(
            parsed.memory_fills,
            vec![
                MemoryField::ExamDate,
                MemoryField::Subjects,
                MemoryField::DailyHours
            ]
        );
    }

    #[test]
    fn distribution_falls_back_to_general() {
        let parsed = parse("6월 20일 시험 배분");
        let Intent::ExamDistribution { allocations, .. } = parsed.intent else {
            panic!("expected distribution");
        };
        assert_eq!(allocations, vec![SubjectAllocation::weight("General", 1.0)]);
    }

    #[test]
    fn study_plan_fields() {
        let parsed = parse("토익 공부계획 2주 하루 3시간");
        assert_eq!(
            parsed.intent,
            Intent::StudyPlan {
                subject: "토익".into(),
                days: 14,
                hours_per_day: 3.0,
            }
        );
        assert_eq!(parsed.proposed_memory.study_goal.as_deref(), Some("토익"));
    }

    #[test]
    fn study_days_ignore_written_dates() {
        assert_eq!(study_days("6월 9일까지 토익 공부계획"), None);
        assert_eq!(study_days("2026-06-09 토익 공부계획"), None);
        assert_eq!(study_days("6월 30일까지 토익 공부계획 14일"), Some(14));
        assert_eq!(study_days("토익 공부계획 10일간"), Some(10));

        let parsed = parse("6월 9일까지 토익 공부계획");
        assert!(matches!(parsed.intent, Intent::StudyPlan { days: 7, .. }));
    }

    #[test]
    fn study_plan_defaults_and_memory() {
        let parsed = parse("공부계획 세워줘");
        assert_eq!(
            parsed.intent,
            Intent::StudyPlan {
                subject: "General".into(),
                days: 7,
                hours_per_day: 2.0,
            }
        );

        let memory = MemoryState {
            study_goal: Some("정보처리기사".into()),
            study_days: Some(10),
            ..MemoryState::default()
        };
        let parsed = parse_intent("공부계획 다시", now(), &memory).unwrap();
        assert_eq!(
            parsed.intent,
            Intent::StudyPlan {
                subject: "정보처리기사".into(),
                days: 10,
                hours_per_day: 2.0,
            }
        );
        assert!(parsed.used_memory());
    }

    #[test]
    fn study_goal_skips_numbers_and_noise() {
        assert_eq!(study_goal("14일 토익 공부계획").as_deref(), Some("토익"));
        assert_eq!(study_goal("하루 2시간 공부계획"), None);
        assert_eq!(study_goal("공부계획"), None);
    }

    #[test]
    fn dday_with_explicit_date() {
        let parsed = parse("기말고사 6월 20일까지 며칠 남았어?");
        assert_eq!(
            parsed.intent,
            Intent::DdayQuery {
                target: date(2026, 6, 20),
                title: Some("기말고사".into()),
            }
        );
        assert_eq!(parsed.proposed_memory.exam_date, Some(date(2026, 6, 20)));
    }

    #[test]
    fn dday_exam_from_memory() {
        let memory = MemoryState {
            exam_date: Some(date(2026, 6, 20)),
            ..MemoryState::default()
        };
        let parsed = parse_intent("시험 며칠 남았어", now(), &memory).unwrap();
        assert!(matches!(
            parsed.intent,
            Intent::DdayQuery { target, .. } if target == date(2026, 6, 20)
        ));
        assert_eq!(parsed.memory_fills, vec![MemoryField::ExamDate]);
    }

    #[test]
    fn dday_without_target_is_unrecognized() {
        let parsed = parse("며칠 남았지");
        assert_eq!(parsed.tag, IntentTag::DdayQuery);
        assert_eq!(parsed.intent, Intent::Unrecognized);
    }

    #[test]
    fn unrecognized_text() {
        let parsed = parse("고마워");
        assert_eq!(parsed.intent, Intent::Unrecognized);
        assert_eq!(parsed.proposed_memory, MemoryState::default());
    }
}
