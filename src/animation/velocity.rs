//! Velocity estimation for drag gestures
//!
//! The trackers record *differential* samples (how far the value moved since
//! the previous sample) and estimate the release velocity with the impulse
//! strategy: the kinetic energy imparted by each sample is accumulated from
//! the oldest sample to the newest, so late samples dominate the result.

use crate::core::geo::Point;
use std::collections::VecDeque;

/// Samples older than this, relative to the newest one, are ignored
const HORIZON_MS: u64 = 100;

/// A gap this long between two samples means the pointer stopped
const ASSUME_POINTER_STOPPED_MS: u64 = 40;

const HISTORY_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    time_ms: u64,
    delta: f64,
}

/// Single-axis velocity tracker for differential data
#[derive(Debug, Clone)]
pub struct VelocityTracker1D {
    samples: VecDeque<Sample>,
}

impl Default for VelocityTracker1D {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_SIZE),
        }
    }
}

impl VelocityTracker1D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the value moved by `delta` at `time_ms`
    pub fn add_data_point(&mut self, time_ms: u64, delta: f64) {
        if self.samples.len() == HISTORY_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { time_ms, delta });
    }

    /// Estimated velocity in units per second, clamped to `±max_velocity`
    pub fn calculate_velocity(&self, max_velocity: f64) -> f64 {
        let window = self.recent_window();
        let velocity_per_ms = match window.len() {
            0 | 1 => 0.0,
            _ => impulse_velocity(&window),
        };

        let velocity = velocity_per_ms * 1000.0;
        if !velocity.is_finite() {
            return 0.0;
        }
        let max = max_velocity.abs();
        velocity.clamp(-max, max)
    }

    pub fn reset_tracking(&mut self) {
        self.samples.clear();
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Samples inside the horizon with no stop between them, oldest first
    fn recent_window(&self) -> Vec<Sample> {
        let Some(newest) = self.samples.back().copied() else {
            return Vec::new();
        };

        let mut window = Vec::with_capacity(self.samples.len());
        let mut previous = newest;
        for sample in self.samples.iter().rev() {
            let age = newest.time_ms.saturating_sub(sample.time_ms);
            let gap = previous.time_ms.abs_diff(sample.time_ms);
            if age > HORIZON_MS || gap > ASSUME_POINTER_STOPPED_MS {
                break;
            }
            window.push(*sample);
            previous = *sample;
        }
        window.reverse();
        window
    }
}

/// Impulse estimate over `samples` (oldest first), in units per millisecond.
///
/// The delta of the oldest sample happened before the window opened, so it
/// only anchors the first time step.
fn impulse_velocity(samples: &[Sample]) -> f64 {
    let mut work = 0.0;
    for (index, pair) in samples.windows(2).enumerate() {
        let (older, newer) = (pair[0], pair[1]);
        if newer.time_ms == older.time_ms {
            continue;
        }
        let dt = (newer.time_ms - older.time_ms) as f64;
        let current = newer.delta / dt;
        let previous = kinetic_energy_to_velocity(work);
        work += (current - previous) * current.abs();
        if index == 0 {
            work *= 0.5;
        }
    }
    kinetic_energy_to_velocity(work)
}

fn kinetic_energy_to_velocity(kinetic_energy: f64) -> f64 {
    kinetic_energy.signum() * (2.0 * kinetic_energy.abs()).sqrt()
}

/// Two-axis tracker used for the camera's lat/long offset
#[derive(Debug, Clone, Default)]
pub struct DiffVelocityTracker {
    x: VelocityTracker1D,
    y: VelocityTracker1D,
}

impl DiffVelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_data_point(&mut self, time_ms: u64, delta: Point) {
        self.x.add_data_point(time_ms, delta.x);
        self.y.add_data_point(time_ms, delta.y);
    }

    /// Per-axis velocity in units per second, each axis clamped to `±max_velocity`
    pub fn calculate_velocity(&self, max_velocity: f64) -> Point {
        Point::new(
            self.x.calculate_velocity(max_velocity),
            self.y.calculate_velocity(max_velocity),
        )
    }

    pub fn reset_tracking(&mut self) {
        self.x.reset_tracking();
        self.y.reset_tracking();
    }

    pub fn is_empty(&self) -> bool {
        self.x.sample_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f64 = 1.0e6;

    #[test]
    fn test_too_few_samples_give_zero() {
        let mut tracker = VelocityTracker1D::new();
        assert_eq!(tracker.calculate_velocity(MAX), 0.0);
        tracker.add_data_point(0, 5.0);
        assert_eq!(tracker.calculate_velocity(MAX), 0.0);
    }

    #[test]
    fn test_two_samples_are_delta_over_dt() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(100, 1.0);
        tracker.add_data_point(116, 4.0);
        // 4 units in 16 ms
        assert!((tracker.calculate_velocity(MAX) - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_motion_reports_constant_speed() {
        let mut tracker = VelocityTracker1D::new();
        for i in 0..6 {
            tracker.add_data_point(i * 10, -2.0);
        }
        assert!((tracker.calculate_velocity(MAX) + 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_stopped_pointer_discards_history() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0, 50.0);
        tracker.add_data_point(10, 50.0);
        // Pause longer than the stop threshold, then a single slow sample
        tracker.add_data_point(80, 1.0);
        assert_eq!(tracker.calculate_velocity(MAX), 0.0);
    }

    #[test]
    fn test_old_samples_fall_out_of_horizon() {
        let mut tracker = VelocityTracker1D::new();
        for i in 0..30 {
            tracker.add_data_point(i * 10, if i < 15 { 100.0 } else { 1.0 });
        }
        assert!((tracker.calculate_velocity(MAX) - 100.0).abs() < 1e-6);
        assert_eq!(tracker.sample_count(), 20);
    }

    #[test]
    fn test_later_samples_dominate() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0, 0.0);
        tracker.add_data_point(10, 1.0);
        tracker.add_data_point(20, 1.0);
        tracker.add_data_point(30, 5.0);
        let velocity = tracker.calculate_velocity(MAX);
        // A plain average would give about 233
        assert!(velocity > 400.0 && velocity < 700.0, "{velocity}");
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0, 0.0);
        tracker.add_data_point(1, 100.0);
        assert_eq!(tracker.calculate_velocity(500.0), 500.0);
    }

    #[test]
    fn test_duplicate_timestamps_are_skipped() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0, 0.0);
        tracker.add_data_point(0, 3.0);
        assert_eq!(tracker.calculate_velocity(MAX), 0.0);
    }

    #[test]
    fn test_diff_tracker_tracks_both_axes() {
        let mut tracker = DiffVelocityTracker::new();
        tracker.add_data_point(0, Point::new(0.0, 0.0));
        tracker.add_data_point(20, Point::new(-1.0, 0.5));
        let velocity = tracker.calculate_velocity(MAX);
        assert!((velocity.x + 50.0).abs() < 1e-9);
        assert!((velocity.y - 25.0).abs() < 1e-9);

        tracker.reset_tracking();
        assert!(tracker.is_empty());
        assert_eq!(tracker.calculate_velocity(MAX), Point::ZERO);
    }
}
