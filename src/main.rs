mod app;
mod config;
mod error;
mod monitor;
mod notify;
mod ui;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use app::App;
use config::Settings;
use monitor::MIN_INTERVAL;

/// Shows kernel_task CPU usage as a thermal-state indicator
#[derive(Parser, Debug)]
#[command(name = "ktm", version, about)]
struct Args {
    /// Always show the CPU percentage and log every sample
    #[arg(long)]
    debug: bool,

    /// Update interval in seconds (min 0.5)
    #[arg(short = 't', value_name = "SECONDS", default_value_t = 5.0)]
    interval: f64,

    /// Configuration file (default: ~/.kernel_task_monitor.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log state changes instead of showing a tray indicator
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn interval(&self) -> Duration {
        if !self.interval.is_finite() || self.interval < MIN_INTERVAL.as_secs_f64() {
            return MIN_INTERVAL;
        }
        Duration::try_from_secs_f64(self.interval).unwrap_or(Duration::MAX)
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    log::debug!("Loading configuration from {}", config_path.display());
    let settings = Settings::load(config_path, args.interval(), args.debug);

    let app = App::new(settings);
    log::debug!("{}", ui::tooltip(app.settings()));

    if args.headless {
        return app.run_headless();
    }
    run(app)
}

#[cfg(feature = "tray")]
fn run(app: App) -> anyhow::Result<()> {
    app.run_tray()
}

#[cfg(not(feature = "tray"))]
fn run(app: App) -> anyhow::Result<()> {
    log::warn!("Built without tray support, running headless");
    app.run_headless()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_is_clamped() {
        let args = Args::parse_from(["ktm", "-t", "0.1"]);
        assert_eq!(args.interval(), MIN_INTERVAL);

        let args = Args::parse_from(["ktm", "-t", "2.5", "--debug"]);
        assert_eq!(args.interval(), Duration::from_millis(2500));
        assert!(args.debug);
    }

    #[test]
    fn test_huge_interval_saturates() {
        let args = Args::parse_from(["ktm", "-t", "1e30"]);
        assert_eq!(args.interval(), Duration::MAX);

        let args = Args::parse_from(["ktm", "-t", "NaN"]);
        assert_eq!(args.interval(), MIN_INTERVAL);
    }

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["ktm"]);
        assert_eq!(args.interval(), Settings::DEFAULT_INTERVAL);
        assert!(!args.headless);
        assert!(args.config.is_none());
    }
}
