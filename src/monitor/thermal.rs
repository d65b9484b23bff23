/// Thermal state inferred from kernel_task CPU usage, ordered by severity.
///
/// macOS parks kernel_task on cores to keep them away from user work when the
/// machine runs hot, so its CPU share is a usable proxy for throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThermalState {
    Idle,
    LightLoad,
    HeavyLoad,
    Throttling,
    HeavyThrottling,
}

impl ThermalState {
    /// Human readable name shown in the menu
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::LightLoad => "Light Load",
            Self::HeavyLoad => "Heavy Load",
            Self::Throttling => "Throttling",
            Self::HeavyThrottling => "Heavy Throttling",
        }
    }

    /// Name sent to the notifier endpoint (spaces replaced by underscores)
    pub fn wire_name(&self) -> String {
        self.label().replace(' ', "_")
    }
}

impl std::fmt::Display for ThermalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper (inclusive) CPU-percent bounds of the first four states
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    pub idle: f64,
    pub light: f64,
    pub heavy: f64,
    pub throttle: f64,
}

impl ThresholdSet {
    pub const DEFAULT_IDLE: f64 = 5.0;
    pub const DEFAULT_LIGHT: f64 = 20.0;
    pub const DEFAULT_HEAVY: f64 = 50.0;
    pub const DEFAULT_THROTTLE: f64 = 100.0;

    /// Whether the boundaries ascend strictly. Inverted sets still classify,
    /// the first matching bound wins.
    pub fn is_ascending(&self) -> bool {
        self.idle < self.light && self.light < self.heavy && self.heavy < self.throttle
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            idle: Self::DEFAULT_IDLE,
            light: Self::DEFAULT_LIGHT,
            heavy: Self::DEFAULT_HEAVY,
            throttle: Self::DEFAULT_THROTTLE,
        }
    }
}

/// Map a kernel_task CPU percentage onto a thermal state.
///
/// Values above 100 are expected (the figure is summed across cores) and land
/// in `HeavyThrottling`.
pub fn classify(cpu: f64, thresholds: &ThresholdSet) -> ThermalState {
    if cpu <= thresholds.idle {
        ThermalState::Idle
    } else if cpu <= thresholds.light {
        ThermalState::LightLoad
    } else if cpu <= thresholds.heavy {
        ThermalState::HeavyLoad
    } else if cpu <= thresholds.throttle {
        ThermalState::Throttling
    } else {
        ThermalState::HeavyThrottling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_buckets() {
        let t = ThresholdSet::default();
        assert_eq!(classify(0.0, &t), ThermalState::Idle);
        assert_eq!(classify(3.2, &t), ThermalState::Idle);
        assert_eq!(classify(12.0, &t), ThermalState::LightLoad);
        assert_eq!(classify(45.0, &t), ThermalState::HeavyLoad);
        assert_eq!(classify(75.0, &t), ThermalState::Throttling);
        assert_eq!(classify(250.0, &t), ThermalState::HeavyThrottling);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let t = ThresholdSet::default();
        let eps = 1e-6;
        assert_eq!(classify(t.idle, &t), ThermalState::Idle);
        assert_eq!(classify(t.idle + eps, &t), ThermalState::LightLoad);
        assert_eq!(classify(t.light, &t), ThermalState::LightLoad);
        assert_eq!(classify(t.light + eps, &t), ThermalState::HeavyLoad);
        assert_eq!(classify(t.heavy, &t), ThermalState::HeavyLoad);
        assert_eq!(classify(t.heavy + eps, &t), ThermalState::Throttling);
        assert_eq!(classify(t.throttle, &t), ThermalState::Throttling);
        assert_eq!(classify(t.throttle + eps, &t), ThermalState::HeavyThrottling);
    }

    #[test]
    fn test_monotonic() {
        let sets = [
            ThresholdSet::default(),
            ThresholdSet {
                idle: 1.0,
                light: 2.0,
                heavy: 3.0,
                throttle: 4.0,
            },
            ThresholdSet {
                idle: 10.0,
                light: 60.0,
                heavy: 150.0,
                throttle: 300.0,
            },
        ];

        for t in &sets {
            let mut previous = ThermalState::Idle;
            let mut cpu = 0.0;
            while cpu < 400.0 {
                let state = classify(cpu, t);
                assert!(state >= previous, "{cpu} went from {previous} to {state}");
                previous = state;
                cpu += 0.25;
            }
        }
    }

    #[test]
    fn test_inverted_thresholds_use_first_match() {
        let t = ThresholdSet {
            idle: 5.0,
            light: 20.0,
            heavy: 10.0,
            throttle: 100.0,
        };
        assert!(!t.is_ascending());
        // 15 is above light and heavy: the heavy bucket is skipped entirely
        assert_eq!(classify(15.0, &t), ThermalState::LightLoad);
        assert_eq!(classify(25.0, &t), ThermalState::Throttling);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(ThermalState::HeavyLoad.wire_name(), "Heavy_Load");
        assert_eq!(ThermalState::Idle.wire_name(), "Idle");
        assert_eq!(ThermalState::HeavyThrottling.wire_name(), "Heavy_Throttling");
    }
}
