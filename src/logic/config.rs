// Engine configuration. Every value has a business default, so an empty file is valid.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logic::{error::ConfigError, time::{resolve_timezone, TimeOfDay}, types::RoundNumber};

// Timezone used when a request does not name one.
pub const DEFAULT_TIMEZONE: &str = "America/Mexico_City";

// Language of the generated human-readable labels.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    English,
    Spanish,
}

impl Locale {
    // Label of a regular round, e.g. "Round 3".
    pub fn round_label(&self, round: RoundNumber) -> String {
        match self {
            Locale::English => format!("Round {round}"),
            Locale::Spanish => format!("Jornada {round}"),
        }
    }

    // Venue shown until the host assigns a real one.
    pub fn venue_placeholder(&self) -> &'static str {
        match self {
            Locale::English => "To be confirmed",
            Locale::Spanish => "Por definir",
        }
    }

    // Label of one leg of a repechage tie.
    pub fn repechage_leg_label(&self, leg: u8) -> String {
        match self {
            Locale::English => format!("Repechage leg {leg}"),
            Locale::Spanish => format!("Repechaje partido {leg}"),
        }
    }
}

#[derive(Debug, Clone)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub default_timezone: String,
    pub time_slots: Vec<TimeOfDay>,  // In the order they are filled each day.
    pub max_scan_days: u32,  // How far forward the slot search may look before giving up.
    pub locale: Locale,
    pub min_teams: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            time_slots: default_time_slots(),
            max_scan_days: 730,
            locale: Locale::default(),
            min_teams: 3,
        }
    }
}

// 16:00, 18:00 and 20:00.
fn default_time_slots() -> Vec<TimeOfDay> {
    [16, 18, 20].iter()
        .filter_map(|hour| TimeOfDay::build(*hour, 0).ok())
        .collect()
}

#[derive(Debug, Clone)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub min_teams: usize,
    pub max_teams: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            min_teams: 9,
            max_teams: 14,
        }
    }
}

#[derive(Debug, Default, Clone)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub format: FormatConfig,
}

impl EngineConfig {
    // Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        return Self::from_toml_str(&contents);
    }

    // Parse and validate a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        return Ok(config);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheduler = &self.scheduler;
        if scheduler.time_slots.is_empty() {
            return Err(ConfigError::Invalid("at least one time slot is required".to_string()));
        }

        if scheduler.time_slots.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid("time slots must be in strictly increasing order".to_string()));
        }

        if scheduler.max_scan_days == 0 {
            return Err(ConfigError::Invalid("max_scan_days must be positive".to_string()));
        }

        if scheduler.min_teams < 2 {
            return Err(ConfigError::Invalid("scheduler.min_teams must be at least 2".to_string()));
        }

        if resolve_timezone(&scheduler.default_timezone).is_err() {
            return Err(ConfigError::Invalid(format!("unknown default timezone '{}'", scheduler.default_timezone)));
        }

        if self.format.min_teams > self.format.max_teams {
            return Err(ConfigError::Invalid(format!(
                "format.min_teams ({}) is greater than format.max_teams ({})",
                self.format.min_teams, self.format.max_teams
            )));
        }

        return Ok(());
    }
}
