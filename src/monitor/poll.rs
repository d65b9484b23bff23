use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{classify, Reading, Sampler, SharedState};
use crate::config::Settings;
use crate::notify::Notify;
use crate::ui::{render, DisplaySink};

/// Shortest pause between two cycles, and the lowest accepted interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Pause that keeps a whole cycle close to `interval` given the time the
/// sampler already used
pub fn sleep_duration(interval: Duration, sampling: Duration) -> Duration {
    interval.saturating_sub(sampling).max(MIN_INTERVAL)
}

/// Background worker: sample, classify, publish, notify, sleep, repeat.
pub struct PollLoop {
    sampler: Box<dyn Sampler>,
    state: SharedState,
    settings: Arc<Settings>,
    sink: Box<dyn DisplaySink>,
    notifier: Option<Box<dyn Notify>>,
    /// Shown in the sudo hint
    program: String,
    stop: Arc<AtomicBool>,
}

impl PollLoop {
    pub fn new(
        sampler: Box<dyn Sampler>,
        state: SharedState,
        settings: Arc<Settings>,
        sink: Box<dyn DisplaySink>,
    ) -> Self {
        Self {
            sampler,
            state,
            settings,
            sink,
            notifier: None,
            program: std::env::args().next().unwrap_or_else(|| "ktm".to_string()),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notify>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Flag that ends [`PollLoop::run`] after the current cycle
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Run one cycle and return how long sampling took
    pub fn run_cycle(&mut self) -> Duration {
        let started = Instant::now();
        let result = self.sampler.sample();
        let sampling = started.elapsed();

        let reading = match result {
            Ok(cpu) => {
                if self.settings.verbose {
                    log::debug!("kernel_task: CPU {:.1}%", cpu);
                }
                Reading::ok(cpu)
            }
            Err(e) => {
                log::debug!("Error getting kernel_task: {}", e);
                Reading::failed(e.to_string())
            }
        };
        let failed = reading.is_error();
        self.state.update(reading);

        // Copy out and release the lock before any I/O
        let snapshot = self.state.snapshot();
        self.sink.publish(render(&snapshot, &self.settings, &self.program));

        if !failed {
            if let Some(notifier) = &self.notifier {
                let state = classify(snapshot.cpu_percent, &self.settings.thresholds);
                notifier.notify(snapshot.cpu_percent, state);
            }
        }

        sampling
    }

    /// Poll until the stop flag is raised
    pub fn run(mut self) {
        log::info!(
            "Polling kernel_task every {:.1}s",
            self.settings.interval_secs()
        );

        while !self.stop.load(Ordering::Relaxed) {
            let sampling = self.run_cycle();
            let pause = sleep_duration(self.settings.interval, sampling);
            log::trace!("sampling took {:?}, sleeping {:?}", sampling, pause);
            thread::sleep(pause);
        }

        log::debug!("Poll loop stopped");
    }

    /// Move the loop onto its own thread
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("ktm-poll".to_string())
            .spawn(move || self.run())
    }
}
