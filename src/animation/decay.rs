use crate::animation::animatable::AnimationVector;
use crate::core::constants::{DECAY_VELOCITY_THRESHOLD, EXPONENTIAL_DECAY_FRICTION};

/// Exponential velocity decay, the motion of a fling after release.
///
/// Velocity falls off as `v0 * e^(friction * t)`; the animation is over once
/// it drops below the velocity threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    friction: f64,
    velocity_threshold: f64,
}

impl ExponentialDecay {
    /// `friction_multiplier` scales the base friction, higher values stop sooner
    pub fn new(friction_multiplier: f64, velocity_threshold: f64) -> Self {
        Self {
            friction: EXPONENTIAL_DECAY_FRICTION * friction_multiplier.max(1e-4),
            velocity_threshold: velocity_threshold.abs().max(1e-7),
        }
    }

    pub fn with_friction_multiplier(friction_multiplier: f64) -> Self {
        Self::new(friction_multiplier, DECAY_VELOCITY_THRESHOLD)
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Position after `play_time_ms`, starting at `initial` with `velocity` units per second
    pub fn value_at(&self, initial: f64, velocity: f64, play_time_ms: u64) -> f64 {
        let t = play_time_ms as f64 / 1000.0;
        initial + velocity / self.friction * ((self.friction * t).exp() - 1.0)
    }

    pub fn velocity_at(&self, velocity: f64, play_time_ms: u64) -> f64 {
        let t = play_time_ms as f64 / 1000.0;
        velocity * (self.friction * t).exp()
    }

    /// Time until the velocity falls below the threshold; zero for slow starts
    pub fn duration_ms(&self, velocity: f64) -> u64 {
        if velocity.abs() <= self.velocity_threshold {
            return 0;
        }
        let seconds = (self.velocity_threshold / velocity.abs()).ln() / self.friction;
        (seconds * 1000.0).ceil() as u64
    }

    /// Where the motion comes to rest
    pub fn target_value(&self, initial: f64, velocity: f64) -> f64 {
        initial - velocity / self.friction
    }
}

impl Default for ExponentialDecay {
    fn default() -> Self {
        Self::new(1.0, DECAY_VELOCITY_THRESHOLD)
    }
}

/// A decay applied independently to every axis of a vector value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayAnimation<V: AnimationVector> {
    decay: ExponentialDecay,
    initial_value: V,
    initial_velocity: V,
    duration_ms: u64,
}

impl<V: AnimationVector> DecayAnimation<V> {
    pub fn new(decay: ExponentialDecay, initial_value: V, initial_velocity: V) -> Self {
        let duration_ms = (0..V::AXES)
            .map(|axis| decay.duration_ms(initial_velocity.axis(axis)))
            .max()
            .unwrap_or(0);
        Self {
            decay,
            initial_value,
            initial_velocity,
            duration_ms,
        }
    }

    /// Length of the slowest axis
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn value_at(&self, play_time_ms: u64) -> V {
        let velocity = self.initial_velocity;
        self.initial_value.map_axes(|axis, initial| {
            self.decay
                .value_at(initial, velocity.axis(axis), play_time_ms)
        })
    }

    pub fn velocity_at(&self, play_time_ms: u64) -> V {
        self.initial_velocity
            .map_axes(|_, velocity| self.decay.velocity_at(velocity, play_time_ms))
    }

    pub fn target_value(&self) -> V {
        let velocity = self.initial_velocity;
        self.initial_value
            .map_axes(|axis, initial| self.decay.target_value(initial, velocity.axis(axis)))
    }

    pub fn is_finished_at(&self, play_time_ms: u64) -> bool {
        play_time_ms >= self.duration_ms
    }
}
