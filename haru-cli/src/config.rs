//! Configuration at ~/.config/haru/config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File};
use haru_core::PlannerSettings;
use serde::Deserialize;

static DEFAULT_DATA_DIR: &str = "~/.haru";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

#[derive(Deserialize, Clone, Debug)]
pub struct HaruConfig {
    /// Where events.json and memory.json live
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub planner: PlannerSettings,
}

impl HaruConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("haru");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented default on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .with_context(|| format!("Could not read {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# haru configuration

# Where events and memory are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

[planner]
# Start time of generated study blocks:
# study_block_start = \"20:00\"

# Time of the exam-day reminder:
# exam_reminder_time = \"09:00\"

# Hours per day split across weighted subjects:
# default_daily_budget = 3.0

# Study plan length and hours when none are given or remembered:
# default_study_days = 7
# default_study_hours = 2.0
# max_study_days = 180

# Furthest exam date a distribution accepts, in days from today:
# max_window_days = 366
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Could not create config directory")?;
        }

        std::fs::write(path, contents).context("Could not write config file")?;

        Ok(())
    }
}
