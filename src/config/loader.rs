use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::{ConfigFile, Settings};
use crate::error::ConfigError;

pub(super) const CONFIG_FILE_NAME: &str = ".kernel_task_monitor.json";

/// `~/.kernel_task_monitor.json`, or the working directory when no home exists
pub fn default_config_path() -> PathBuf {
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(CONFIG_FILE_NAME),
        None => {
            log::warn!("Could not determine home directory, using current directory");
            PathBuf::from(CONFIG_FILE_NAME)
        }
    }
}

/// Read the configuration file. A missing file is not an error.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(ConfigFile::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_config(&text)
}

/// Parse JSON5 (comments, trailing commas), falling back to strict JSON
pub fn parse_config(text: &str) -> Result<ConfigFile, ConfigError> {
    match json5::from_str::<ConfigFile>(text) {
        Ok(config) => Ok(config),
        Err(json5_err) => serde_json::from_str::<ConfigFile>(text).map_err(|json_err| {
            ConfigError::Parse(format!("{} (as JSON: {})", json5_err, json_err))
        }),
    }
}

fn resolve_endpoint(raw: &str) -> Result<Option<Url>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    Url::parse(raw)
        .map(Some)
        .map_err(|source| ConfigError::InvalidUrl {
            url: raw.to_string(),
            source,
        })
}

impl Settings {
    /// Load the file at `config_path` and combine it with the command line.
    ///
    /// Problems with the file are logged and replaced by defaults.
    pub fn load(config_path: PathBuf, interval: Duration, verbose: bool) -> Self {
        let file = load_config(&config_path).unwrap_or_else(|e| {
            log::warn!("{}", e);
            ConfigFile::default()
        });

        Self::from_file(&file, config_path, interval, verbose)
    }

    pub fn from_file(
        file: &ConfigFile,
        config_path: PathBuf,
        interval: Duration,
        verbose: bool,
    ) -> Self {
        let thresholds = file.thresholds.resolve();
        if !thresholds.is_ascending() {
            log::warn!(
                "Thresholds not ascending (idle {}, light {}, heavy {}, throttle {})",
                thresholds.idle,
                thresholds.light,
                thresholds.heavy,
                thresholds.throttle
            );
        }

        let endpoint = resolve_endpoint(&file.esp_url).unwrap_or_else(|e| {
            log::warn!("{}; ESP32 notifications disabled", e);
            None
        });

        Self {
            thresholds,
            emojis: file.emojis.resolve(),
            endpoint,
            interval,
            verbose,
            config_path,
        }
    }
}
