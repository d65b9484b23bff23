mod loader;
mod template;

pub use loader::{default_config_path, load_config, parse_config};
pub use template::{create_config_template, open_config_file, CONFIG_TEMPLATE};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::monitor::{ThermalState, ThresholdSet};

/// On-disk configuration (`~/.kernel_task_monitor.json`).
///
/// Every field is optional; anything missing falls back to a built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Base URL of the ESP32 receiver, empty disables notifications
    pub esp_url: String,
    pub thresholds: ThresholdOverrides,
    pub emojis: EmojiOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heavy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle: Option<f64>,
}

impl ThresholdOverrides {
    /// Apply the overrides to the defaults; non-positive values are ignored
    pub fn resolve(&self) -> ThresholdSet {
        fn pick(value: Option<f64>, default: f64) -> f64 {
            value.filter(|v| *v > 0.0).unwrap_or(default)
        }

        ThresholdSet {
            idle: pick(self.idle, ThresholdSet::DEFAULT_IDLE),
            light: pick(self.light, ThresholdSet::DEFAULT_LIGHT),
            heavy: pick(self.heavy, ThresholdSet::DEFAULT_HEAVY),
            throttle: pick(self.throttle, ThresholdSet::DEFAULT_THROTTLE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_load: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heavy_load: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heavy_throttling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmojiOverrides {
    pub fn resolve(&self) -> EmojiSet {
        fn pick(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }

        let defaults = EmojiSet::default();
        EmojiSet {
            idle: pick(&self.idle, &defaults.idle),
            light_load: pick(&self.light_load, &defaults.light_load),
            heavy_load: pick(&self.heavy_load, &defaults.heavy_load),
            throttling: pick(&self.throttling, &defaults.throttling),
            heavy_throttling: pick(&self.heavy_throttling, &defaults.heavy_throttling),
            error: pick(&self.error, &defaults.error),
        }
    }
}

/// Title glyphs for each thermal state plus the error indicator
#[derive(Debug, Clone, PartialEq)]
pub struct EmojiSet {
    pub idle: String,
    pub light_load: String,
    pub heavy_load: String,
    pub throttling: String,
    pub heavy_throttling: String,
    pub error: String,
}

impl EmojiSet {
    pub fn for_state(&self, state: ThermalState) -> &str {
        match state {
            ThermalState::Idle => &self.idle,
            ThermalState::LightLoad => &self.light_load,
            ThermalState::HeavyLoad => &self.heavy_load,
            ThermalState::Throttling => &self.throttling,
            ThermalState::HeavyThrottling => &self.heavy_throttling,
        }
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

impl Default for EmojiSet {
    fn default() -> Self {
        Self {
            idle: "😴".to_string(),
            light_load: "😊".to_string(),
            heavy_load: "😅".to_string(),
            throttling: "🥵".to_string(),
            heavy_throttling: "🔥".to_string(),
            error: "❓".to_string(),
        }
    }
}

/// Process-wide settings, fixed at startup and shared without locking
#[derive(Debug, Clone)]
pub struct Settings {
    pub thresholds: ThresholdSet,
    pub emojis: EmojiSet,
    /// Notifier endpoint; `None` disables notifications
    pub endpoint: Option<Url>,
    pub interval: Duration,
    /// Always show the percentage and log every cycle
    pub verbose: bool,
    pub config_path: PathBuf,
}

impl Settings {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

    pub fn interval_secs(&self) -> f64 {
        self.interval.as_secs_f64()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thresholds: ThresholdSet::default(),
            emojis: EmojiSet::default(),
            endpoint: None,
            interval: Self::DEFAULT_INTERVAL,
            verbose: false,
            config_path: PathBuf::from(loader::CONFIG_FILE_NAME),
        }
    }
}
