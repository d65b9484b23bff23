use std::sync::mpsc::Sender;

use crate::config::Settings;
use crate::error::is_privilege_message;
use crate::monitor::{classify, Snapshot, ThermalState};

/// Title shown before the first sample completes
pub const PLACEHOLDER_TITLE: &str = "--%";

/// Everything the indicator shows for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUpdate {
    pub title: String,
    /// "State: ..." menu line
    pub status: String,
    pub state: Option<ThermalState>,
    /// Present only while the last sample failed
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub message: String,
    pub hints: [String; 3],
}

impl ErrorReport {
    pub fn new(message: &str, program: &str) -> Self {
        let hints = if is_privilege_message(message) {
            [
                "To fix: Run with sudo".to_string(),
                format!("Terminal: sudo {}", program),
                "Or: Configure sudo NOPASSWD for top".to_string(),
            ]
        } else {
            [
                "Cannot read kernel_task CPU usage".to_string(),
                "This should not happen - kernel_task always exists".to_string(),
                "Try restarting the app".to_string(),
            ]
        };

        Self {
            message: message.to_string(),
            hints,
        }
    }

    /// Menu line carrying the error text
    pub fn line(&self) -> String {
        format!("⚠️ Error: {}", self.message)
    }
}

/// Receives rendered state from the poll worker
pub trait DisplaySink: Send {
    fn publish(&mut self, update: DisplayUpdate);
}

/// Turn the stored snapshot into indicator text.
///
/// The percentage joins the glyph once load passes the `light` bound, or
/// always in verbose mode.
pub fn render(snapshot: &Snapshot, settings: &Settings, program: &str) -> DisplayUpdate {
    let cpu = snapshot.cpu_percent;

    if let Some(message) = &snapshot.error {
        let status = if snapshot.has_good_sample {
            let state = classify(cpu, &settings.thresholds);
            format!("State: {} (CPU: {:.0}%, last good)", state, cpu)
        } else {
            "State: Unknown".to_string()
        };
        return DisplayUpdate {
            title: settings.emojis.error().to_string(),
            status,
            state: None,
            error: Some(ErrorReport::new(message, program)),
        };
    }

    if !snapshot.has_sample() {
        return DisplayUpdate {
            title: PLACEHOLDER_TITLE.to_string(),
            status: "State: Unknown".to_string(),
            state: None,
            error: None,
        };
    }

    let state = classify(cpu, &settings.thresholds);
    let mut title = settings.emojis.for_state(state).to_string();
    if settings.verbose || cpu > settings.thresholds.light {
        title.push_str(&format!(" {:.0}%", cpu));
    }

    DisplayUpdate {
        title,
        status: format!("State: {} (CPU: {:.0}%)", state, cpu),
        state: Some(state),
        error: None,
    }
}

pub fn tooltip(settings: &Settings) -> String {
    let mut text = format!("kernel_task CPU Monitor (update: {:.1}s)", settings.interval_secs());
    if settings.verbose {
        text.push_str(" [DEBUG]");
    }
    text
}

pub fn endpoint_line(settings: &Settings) -> String {
    match &settings.endpoint {
        Some(url) => format!("ESP32 URL: {}", url),
        None => "ESP32: Disabled".to_string(),
    }
}

pub fn settings_line(settings: &Settings) -> String {
    let debug = if settings.verbose { ", Debug ON" } else { "" };
    format!("Update: {:.1}s{}", settings.interval_secs(), debug)
}

/// Writes title changes to the log; used when running without a tray
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<DisplayUpdate>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for LogSink {
    fn publish(&mut self, update: DisplayUpdate) {
        if self.last.as_ref() == Some(&update) {
            return;
        }

        match &update.error {
            Some(report) => {
                log::error!("{} {}", update.title, report.line());
                for hint in &report.hints {
                    log::error!("  {}", hint);
                }
            }
            None => log::info!("{} | {}", update.title, update.status),
        }
        self.last = Some(update);
    }
}

/// Forwards updates to the UI thread
pub struct ChannelSink {
    tx: Sender<DisplayUpdate>,
}

impl ChannelSink {
    pub fn new(tx: Sender<DisplayUpdate>) -> Self {
        Self { tx }
    }
}

impl DisplaySink for ChannelSink {
    fn publish(&mut self, update: DisplayUpdate) {
        // The receiver is gone once the UI has quit
        if self.tx.send(update).is_err() {
            log::debug!("Display closed, dropping update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{Reading, SharedState};
    use std::sync::mpsc;
    use std::time::Duration;

    fn snapshot_of(readings: Vec<Reading>) -> Snapshot {
        let state = SharedState::new();
        for reading in readings {
            state.update(reading);
        }
        state.snapshot()
    }

    #[test]
    fn test_low_load_hides_percentage() {
        let update = render(&snapshot_of(vec![Reading::ok(3.0)]), &Settings::default(), "ktm");
        assert_eq!(update.title, "😴");
        assert_eq!(update.status, "State: Idle (CPU: 3%)");
        assert_eq!(update.state, Some(ThermalState::Idle));
        assert!(update.error.is_none());
    }

    #[test]
    fn test_percentage_above_light() {
        let update = render(&snapshot_of(vec![Reading::ok(45.0)]), &Settings::default(), "ktm");
        assert_eq!(update.title, "😅 45%");
        assert_eq!(update.status, "State: Heavy Load (CPU: 45%)");

        // exactly at the bound stays hidden
        let update = render(&snapshot_of(vec![Reading::ok(20.0)]), &Settings::default(), "ktm");
        assert_eq!(update.title, "😊");
    }

    #[test]
    fn test_verbose_always_shows_percentage() {
        let settings = Settings {
            verbose: true,
            ..Default::default()
        };
        let update = render(&snapshot_of(vec![Reading::ok(1.4)]), &settings, "ktm");
        assert_eq!(update.title, "😴 1%");
    }

    #[test]
    fn test_privilege_error_hints() {
        let snap = snapshot_of(vec![Reading::failed(
            "top exited with exit status: 1: must be run privileged",
        )]);
        let update = render(&snap, &Settings::default(), "/usr/local/bin/ktm");
        assert_eq!(update.title, "❓");
        let report = update.error.unwrap();
        assert_eq!(report.hints[0], "To fix: Run with sudo");
        assert_eq!(report.hints[1], "Terminal: sudo /usr/local/bin/ktm");
        assert!(report.line().contains("must be run privileged"));
    }

    #[test]
    fn test_generic_error_hints() {
        let snap = snapshot_of(vec![
            Reading::ok(30.0),
            Reading::failed("unexpected top output: bad"),
        ]);
        let update = render(&snap, &Settings::default(), "ktm");
        let report = update.error.unwrap();
        assert_eq!(report.hints[0], "Cannot read kernel_task CPU usage");
        assert_eq!(update.status, "State: Heavy Load (CPU: 30%, last good)");
    }

    #[test]
    fn test_error_after_zero_reading_keeps_state() {
        let snap = snapshot_of(vec![
            Reading::ok(0.0),
            Reading::failed("unexpected top output: bad"),
        ]);
        let update = render(&snap, &Settings::default(), "ktm");
        assert_eq!(update.status, "State: Idle (CPU: 0%, last good)");

        let snap = snapshot_of(vec![Reading::failed("unexpected top output: bad")]);
        let update = render(&snap, &Settings::default(), "ktm");
        assert_eq!(update.status, "State: Unknown");
    }

    #[test]
    fn test_before_first_sample() {
        let update = render(&Snapshot::default(), &Settings::default(), "ktm");
        assert_eq!(update.title, PLACEHOLDER_TITLE);
        assert_eq!(update.status, "State: Unknown");
    }

    #[test]
    fn test_static_lines() {
        let mut settings = Settings {
            interval: Duration::from_millis(2500),
            ..Default::default()
        };
        assert_eq!(tooltip(&settings), "kernel_task CPU Monitor (update: 2.5s)");
        assert_eq!(settings_line(&settings), "Update: 2.5s");
        assert_eq!(endpoint_line(&settings), "ESP32: Disabled");

        settings.verbose = true;
        settings.endpoint = Some(url::Url::parse("http://esp32.local/fanspeed").unwrap());
        assert_eq!(tooltip(&settings), "kernel_task CPU Monitor (update: 2.5s) [DEBUG]");
        assert_eq!(settings_line(&settings), "Update: 2.5s, Debug ON");
        assert_eq!(endpoint_line(&settings), "ESP32 URL: http://esp32.local/fanspeed");
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (tx, rx) = mpsc::channel();
        let mut sink = ChannelSink::new(tx);
        let update = render(&Snapshot::default(), &Settings::default(), "ktm");

        sink.publish(update.clone());
        assert_eq!(rx.recv().unwrap(), update);

        drop(rx);
        sink.publish(update);
    }
}
