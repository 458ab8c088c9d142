//! Planner tunables.
//!
//! Deserialized from the `[planner]` table of the CLI config; every field
//! has a default so a partial table is fine.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

fn default_study_block_start() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default()
}

fn default_exam_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn default_daily_budget() -> f64 {
    3.0
}

fn default_study_days() -> u32 {
    7
}

fn default_study_hours() -> f64 {
    2.0
}

fn default_max_study_days() -> u32 {
    180
}

fn default_max_window_days() -> u32 {
    366
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Start time of every generated study block
    #[serde(default = "default_study_block_start", with = "hhmm")]
    pub study_block_start: NaiveTime,

    /// Time of the exam-day reminder
    #[serde(default = "default_exam_reminder_time", with = "hhmm")]
    pub exam_reminder_time: NaiveTime,

    /// Hours per day split across weighted subjects
    #[serde(default = "default_daily_budget")]
    pub default_daily_budget: f64,

    #[serde(default = "default_study_days")]
    pub default_study_days: u32,

    #[serde(default = "default_study_hours")]
    pub default_study_hours: f64,

    #[serde(default = "default_max_study_days")]
    pub max_study_days: u32,

    /// Furthest exam date, in days from today, a distribution accepts
    #[serde(default = "default_max_window_days")]
    pub max_window_days: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            study_block_start: default_study_block_start(),
            exam_reminder_time: default_exam_reminder_time(),
            default_daily_budget: default_daily_budget(),
            default_study_days: default_study_days(),
            default_study_hours: default_study_hours(),
            max_study_days: default_max_study_days(),
            max_window_days: default_max_window_days(),
        }
    }
}

/// `HH:MM` (seconds optional) in config files.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|e| de::Error::custom(format!("invalid time '{raw}': {e}")))
    }
}
