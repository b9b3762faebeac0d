//! Rolling performance statistics.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of processing-time samples retained.
const PROCESSING_TIME_SAMPLES: usize = 30;

/// Length of the FPS measurement window.
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Rolling FPS and processing-time statistics.
///
/// FPS is recomputed once per one-second window from an accumulating frame
/// counter; processing times are kept in a bounded ring.
#[derive(Debug)]
pub struct PerformanceStats {
    window_start: Instant,
    frames_in_window: u32,
    current_fps: f64,
    processing_times: VecDeque<Duration>,
    total_frames: u64,
}

impl PerformanceStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames_in_window: 0,
            current_fps: 0.0,
            processing_times: VecDeque::with_capacity(PROCESSING_TIME_SAMPLES),
            total_frames: 0,
        }
    }

    /// Record one processed frame.
    pub fn record_frame(&mut self, processing_time: Duration) {
        self.total_frames += 1;
        self.frames_in_window += 1;

        if self.processing_times.len() == PROCESSING_TIME_SAMPLES {
            self.processing_times.pop_front();
        }
        self.processing_times.push_back(processing_time);

        let elapsed = self.window_start.elapsed();
        if elapsed >= FPS_WINDOW {
            self.current_fps = self.frames_in_window as f64 / elapsed.as_secs_f64();
            self.frames_in_window = 0;
            self.window_start = Instant::now();
        }
    }

    /// Most recently computed FPS value.
    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }

    /// Total frames recorded since the last reset.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Rolling average processing time, if any samples exist.
    pub fn average_processing_time(&self) -> Option<Duration> {
        if self.processing_times.is_empty() {
            return None;
        }
        let sum: Duration = self.processing_times.iter().sum();
        Some(sum / self.processing_times.len() as u32)
    }

    /// Drop the processing-time history only; used on memory pressure.
    pub fn clear_processing_times(&mut self) {
        self.processing_times.clear();
    }

    /// Reset everything.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_is_bounded() {
        let mut stats = PerformanceStats::new();
        for _ in 0..100 {
            stats.record_frame(Duration::from_millis(10));
        }
        assert_eq!(stats.total_frames(), 100);
        assert_eq!(
            stats.average_processing_time(),
            Some(Duration::from_millis(10))
        );
        assert!(stats.processing_times.len() <= PROCESSING_TIME_SAMPLES);
    }

    #[test]
    fn test_average_over_mixed_samples() {
        let mut stats = PerformanceStats::new();
        stats.record_frame(Duration::from_millis(10));
        stats.record_frame(Duration::from_millis(30));
        assert_eq!(
            stats.average_processing_time(),
            Some(Duration::from_millis(20))
        );
    }

    #[test]
    fn test_clear_processing_times_keeps_fps() {
        let mut stats = PerformanceStats::new();
        stats.record_frame(Duration::from_millis(10));
        stats.clear_processing_times();
        assert_eq!(stats.average_processing_time(), None);
        assert_eq!(stats.total_frames(), 1);
    }

    #[test]
    fn test_fps_requires_full_window() {
        let mut stats = PerformanceStats::new();
        stats.record_frame(Duration::from_millis(5));
        // Window has not elapsed, so no FPS value yet.
        assert_eq!(stats.current_fps(), 0.0);
    }
}
