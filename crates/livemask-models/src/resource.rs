//! Device resource state observed at capture time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device thermal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThermalState {
    /// Normal operating temperature
    #[default]
    Nominal,
    /// Slightly elevated
    Fair,
    /// Elevated; processing rate should be reduced
    Serious,
    /// Must stop processing
    Critical,
}

impl ThermalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThermalState::Nominal => "nominal",
            ThermalState::Fair => "fair",
            ThermalState::Serious => "serious",
            ThermalState::Critical => "critical",
        }
    }
}

/// Memory-pressure level reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPressure {
    /// No pressure
    #[default]
    Normal,
    /// Caches should be shed
    Warning,
    /// Allocation is about to fail
    Critical,
}

impl MemoryPressure {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryPressure::Normal => "normal",
            MemoryPressure::Warning => "warning",
            MemoryPressure::Critical => "critical",
        }
    }
}

/// Snapshot of device resource state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Thermal state at capture
    pub thermal: ThermalState,
    /// Memory pressure at capture
    pub memory: MemoryPressure,
    /// Battery level in [0, 1] if known
    pub battery_level: Option<f32>,
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
}

impl ResourceSnapshot {
    /// Snapshot with nominal values, timestamped now.
    pub fn nominal() -> Self {
        Self {
            thermal: ThermalState::Nominal,
            memory: MemoryPressure::Normal,
            battery_level: None,
            captured_at: Utc::now(),
        }
    }
}

impl Default for ResourceSnapshot {
    fn default() -> Self {
        Self::nominal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_state_serde() {
        let json = serde_json::to_string(&ThermalState::Serious).unwrap();
        assert_eq!(json, "\"serious\"");
    }

    #[test]
    fn test_nominal_snapshot() {
        let snapshot = ResourceSnapshot::nominal();
        assert_eq!(snapshot.thermal, ThermalState::Nominal);
        assert_eq!(snapshot.memory, MemoryPressure::Normal);
    }
}
