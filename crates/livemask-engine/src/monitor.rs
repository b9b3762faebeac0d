//! Device resource monitoring.

use std::sync::Mutex;

use livemask_models::{MemoryPressure, ResourceSnapshot, ThermalState};

/// Provider of device resource state.
///
/// Queried once per processed frame for metadata, and consulted for the
/// thermal gate before inference.
pub trait ResourceMonitor: Send + Sync {
    /// Current resource state.
    fn snapshot(&self) -> ResourceSnapshot;
}

/// Monitor returning a settable fixed state. The default reports nominal
/// conditions; tests and headless deployments drive it directly.
#[derive(Debug, Default)]
pub struct StaticMonitor {
    state: Mutex<(ThermalState, MemoryPressure, Option<f32>)>,
}

impl StaticMonitor {
    /// Create a monitor reporting nominal conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reported thermal state.
    pub fn set_thermal(&self, thermal: ThermalState) {
        self.state.lock().unwrap().0 = thermal;
    }

    /// Set the reported memory pressure.
    pub fn set_memory(&self, memory: MemoryPressure) {
        self.state.lock().unwrap().1 = memory;
    }

    /// Set the reported battery level.
    pub fn set_battery(&self, level: Option<f32>) {
        self.state.lock().unwrap().2 = level;
    }
}

impl ResourceMonitor for StaticMonitor {
    fn snapshot(&self) -> ResourceSnapshot {
        let (thermal, memory, battery_level) = *self.state.lock().unwrap();
        ResourceSnapshot {
            thermal,
            memory,
            battery_level,
            captured_at: chrono::Utc::now(),
        }
    }
}
