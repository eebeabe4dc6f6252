use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};
use tokio::time::Duration;

/// Tunables consumed by the advice engine and the sensor cadences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// Minimum gap between advice dispatches; 0 gates on the in-flight
    /// request alone.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// How many focus samples the trend chart keeps.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Vision collaborator snapshot cadence.
    #[serde(default = "default_capture_interval_ms")]
    pub auto_capture_interval_ms: u64,
    /// Give up on an advice call after this long and treat it as a failure.
    #[serde(default = "default_advice_timeout_ms")]
    pub advice_timeout_ms: u64,
}

fn default_cooldown_ms() -> u64 {
    45_000
}

fn default_history_capacity() -> usize {
    15
}

fn default_capture_interval_ms() -> u64 {
    60_000
}

fn default_advice_timeout_ms() -> u64 {
    30_000
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            history_capacity: default_history_capacity(),
            auto_capture_interval_ms: default_capture_interval_ms(),
            advice_timeout_ms: default_advice_timeout_ms(),
        }
    }
}

impl EngineSettings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.auto_capture_interval_ms)
    }

    pub fn advice_timeout(&self) -> Duration {
        Duration::from_millis(self.advice_timeout_ms)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn engine(&self) -> EngineSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, settings: EngineSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
