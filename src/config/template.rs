use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use crate::error::ConfigError;

/// Written by "Configure..." when no configuration file exists yet
pub const CONFIG_TEMPLATE: &str = r#"{
  // Kernel Task Monitor (KTM) Configuration
  // ========================================
  // This file uses JSON5 format, which supports comments and trailing commas
  //
  // IMPORTANT: Restart KTM after making changes to this file!

  // ESP32 Integration (optional)
  // ---------------------------
  // URL of a device that should receive thermal data.
  // Leave empty ("") to disable.
  //
  // Every update sends an HTTP GET with these parameters:
  //   - kernel_task: CPU percentage (0.0-400.0+)
  //   - state: Idle|Light_Load|Heavy_Load|Throttling|Heavy_Throttling
  //
  // Example request:
  //   GET http://192.168.1.100/fanspeed?kernel_task=45.5&state=Heavy_Load

  "esp_url": "",

  // Thermal Thresholds (optional, CPU %)
  // ------------------------------------
  // Each value is the upper bound of its state. Non-positive values are ignored.

  // "thresholds": {
  //   "idle": 5,        // default: 5
  //   "light": 20,      // default: 20
  //   "heavy": 50,      // default: 50
  //   "throttle": 100,  // default: 100, above = Heavy Throttling
  // },

  // Custom Emojis (optional)
  // ------------------------

  // "emojis": {
  //   "idle": "😴",
  //   "light_load": "😊",
  //   "heavy_load": "😅",
  //   "throttling": "🥵",
  //   "heavy_throttling": "🔥",
  //   "error": "❓",
  // },
}
"#;

/// Write [`CONFIG_TEMPLATE`] to `path` unless a file is already there.
///
/// Returns whether a new file was created.
pub fn create_config_template(path: &Path) -> Result<bool, ConfigError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let write_err = |source: io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(write_err(e)),
    };

    file.write_all(CONFIG_TEMPLATE.as_bytes()).map_err(write_err)?;
    Ok(true)
}

/// Create the template if needed and hand the file to the desktop's default editor
pub fn open_config_file(path: &Path) {
    match create_config_template(path) {
        Ok(true) => log::info!("Created configuration template at {}", path.display()),
        Ok(false) => {}
        Err(e) => log::warn!("{}", e),
    }

    let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
    match Command::new(opener).arg(path).spawn() {
        Ok(_) => log::info!("After editing, restart KTM for changes to take effect."),
        Err(e) => {
            log::warn!("Error opening config file with {}: {}", opener, e);
            log::warn!("Config file location: {}", path.display());
        }
    }
}
