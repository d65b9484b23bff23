mod poll;
mod sampler;
mod thermal;

pub use poll::{PollLoop, MIN_INTERVAL};
pub use sampler::{Sampler, TopSampler};
pub use thermal::{classify, ThermalState, ThresholdSet};

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::sync::Arc;

/// Outcome of one poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// kernel_task CPU percentage; `-1.0` on a failed sample (never stored)
    pub cpu_percent: f64,
    pub captured_at: DateTime<Local>,
    pub error: Option<String>,
}

impl Reading {
    pub const FAILED_CPU: f64 = -1.0;

    pub fn ok(cpu_percent: f64) -> Self {
        Self {
            cpu_percent,
            captured_at: Local::now(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            cpu_percent: Self::FAILED_CPU,
            captured_at: Local::now(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Snapshot held by [`SharedState`]
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Last successfully sampled percentage
    pub cpu_percent: f64,
    /// Whether `cpu_percent` came from a real sample rather than the default
    pub has_good_sample: bool,
    /// Time of the most recent cycle, `None` before the first one completes
    pub captured_at: Option<DateTime<Local>>,
    /// Error of the most recent cycle, cleared by the next good sample
    pub error: Option<String>,
}

impl Snapshot {
    pub fn has_sample(&self) -> bool {
        self.captured_at.is_some()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            cpu_percent: 0.0,
            has_good_sample: false,
            captured_at: None,
            error: None,
        }
    }
}

/// Last known kernel_task reading, shared between the poll worker and the UI.
///
/// Cloning yields another handle to the same state. Readers copy the small
/// snapshot out and release the lock immediately.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<Snapshot>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a cycle.
    ///
    /// A failed reading replaces the error but keeps the last good percentage.
    pub fn update(&self, reading: Reading) {
        let mut state = self.inner.write();
        state.captured_at = Some(reading.captured_at);
        match reading.error {
            Some(error) => state.error = Some(error),
            None => {
                state.cpu_percent = reading.cpu_percent;
                state.has_good_sample = true;
                state.error = None;
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().clone()
    }
}
