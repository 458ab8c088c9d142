//! Intent classification by ordered keyword rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datetime::has_temporal_hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    ExamDistribution,
    StudyPlan,
    DdayQuery,
    RegisterEvents,
    Unrecognized,
}

impl IntentTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentTag::ExamDistribution => "exam_distribution",
            IntentTag::StudyPlan => "study_plan",
            IntentTag::DdayQuery => "dday_query",
            IntentTag::RegisterEvents => "register_events",
            IntentTag::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for IntentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification rule: when `matches` holds, the text is `tag`.
#[derive(Clone, Copy)]
pub struct Rule {
    pub tag: IntentTag,
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .finish()
    }
}

/// Evaluated top to bottom; the first match wins.
pub const CLASSIFICATION_RULES: [Rule; 4] = [
    Rule {
        tag: IntentTag::ExamDistribution,
        name: "distribution marker",
        matches: is_distribution_request,
    },
    Rule {
        tag: IntentTag::StudyPlan,
        name: "study plan marker",
        matches: is_study_plan_request,
    },
    Rule {
        tag: IntentTag::DdayQuery,
        name: "days remaining marker",
        matches: is_dday_query,
    },
    Rule {
        tag: IntentTag::RegisterEvents,
        name: "date or time present",
        matches: has_temporal_hint,
    },
];

/// Tag for `text`, `Unrecognized` when no rule matches.
pub fn classify(text: &str) -> IntentTag {
    let tag = CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(text))
        .map_or(IntentTag::Unrecognized, |rule| {
            debug!(rule = rule.name, "classified");
            rule.tag
        });
    debug!(%tag, "intent");
    tag
}

fn is_distribution_request(text: &str) -> bool {
    text.contains("역산") || text.contains("배분")
}

fn is_study_plan_request(text: &str) -> bool {
    let folded: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    folded.contains("공부계획")
}

fn is_dday_query(text: &str) -> bool {
    text.contains("며칠")
        || text.contains("몇일")
        || text.contains("남았")
        || text.to_lowercase().contains("d-day")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_order_is_fixed() {
        let order: Vec<_> = CLASSIFICATION_RULES.iter().map(|r| r.tag).collect();
        assert_eq!(
            order,
            vec![
                IntentTag::ExamDistribution,
                IntentTag::StudyPlan,
                IntentTag::DdayQuery,
                IntentTag::RegisterEvents,
            ]
        );
    }

    #[test]
    fn distribution_outranks_everything() {
        assert_eq!(
            classify("6월 20일 시험까지 수학 40 영어 30 배분, 며칠 남았는지도"),
            IntentTag::ExamDistribution
        );
        assert_eq!(classify("코딩테스트 역산 공부계획"), IntentTag::ExamDistribution);
    }

    #[test]
    fn study_plan_ignores_spacing() {
        assert_eq!(classify("토익 공부 계획 14일"), IntentTag::StudyPlan);
        assert_eq!(classify("토익 공부계획 며칠"), IntentTag::StudyPlan);
    }

    #[test]
    fn dday_markers() {
        assert_eq!(classify("6월 20일까지 며칠 남았어?"), IntentTag::DdayQuery);
        assert_eq!(classify("시험 몇일 남음"), IntentTag::DdayQuery);
        assert_eq!(classify("기말 D-Day 언제"), IntentTag::DdayQuery);
    }

    #[test]
    fn dates_mean_registration() {
        assert_eq!(classify("20일 9시 면접"), IntentTag::RegisterEvents);
        assert_eq!(classify("내일 치과"), IntentTag::RegisterEvents);
        assert_eq!(classify("오후 3시 회의"), IntentTag::RegisterEvents);
    }

    #[test]
    fn nothing_matches() {
        assert_eq!(classify("안녕하세요"), IntentTag::Unrecognized);
        assert_eq!(classify(""), IntentTag::Unrecognized);
    }
}
