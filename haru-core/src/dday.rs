//! Days-remaining answers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdayAnswer {
    pub target: NaiveDate,
    pub title: Option<String>,
    /// Negative once the target has passed
    pub days_left: i64,
}

impl DdayAnswer {
    pub fn new(target: NaiveDate, title: Option<String>, today: NaiveDate) -> Self {
        DdayAnswer {
            target,
            title,
            days_left: (target - today).num_days(),
        }
    }

    /// `D-3`, `D-Day` or `D+2`.
    pub fn label(&self) -> String {
        format_label(self.days_left)
    }
}

impl fmt::Display for DdayAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = &self.title {
            write!(f, "{title}: ")?;
        }

        let date = self.target.format("%Y-%m-%d");
        let label = self.label();
        match self.days_left {
            n if n > 0 => write!(f, "{date}까지 {n}일 남았어요. ({label})"),
            0 => write!(f, "{date} 오늘입니다. ({label})"),
            n => write!(f, "{date} 기준 {}일 지났어요. ({label})", -n),
        }
    }
}

/// D-day label for `target` as seen from `today`.
pub fn dday_label(target: NaiveDate, today: NaiveDate) -> String {
    format_label((target - today).num_days())
}

fn format_label(days_left: i64) -> String {
    match days_left {
        0 => "D-Day".to_string(),
        n if n > 0 => format!("D-{n}"),
        n => format!("D+{}", -n),
    }
}
