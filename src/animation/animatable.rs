//! Tick-driven animated values
//!
//! An [`Animatable`] owns a value, its velocity, optional bounds and at most
//! one running animation. Animations never run on their own: the owner calls
//! [`Animatable::tick`] with the frame time and gets an [`AnimationResult`]
//! back when the animation ends.

use crate::animation::decay::{DecayAnimation, ExponentialDecay};
use crate::animation::easing::Easing;
use crate::core::config::TweenConfig;
use crate::core::geo::Point;
use std::fmt::Debug;

/// Values that can be animated axis by axis
pub trait AnimationVector: Copy + Debug + PartialEq {
    const AXES: usize;
    const ZERO: Self;

    fn axis(&self, index: usize) -> f64;

    /// Builds a new value by transforming each axis
    fn map_axes(&self, f: impl Fn(usize, f64) -> f64) -> Self;

    fn lerp(&self, other: &Self, t: f64) -> Self {
        self.map_axes(|axis, start| start + (other.axis(axis) - start) * t)
    }
}

impl AnimationVector for f64 {
    const AXES: usize = 1;
    const ZERO: Self = 0.0;

    fn axis(&self, _index: usize) -> f64 {
        *self
    }

    fn map_axes(&self, f: impl Fn(usize, f64) -> f64) -> Self {
        f(0, *self)
    }
}

impl AnimationVector for Point {
    const AXES: usize = 2;
    const ZERO: Self = Point::ZERO;

    fn axis(&self, index: usize) -> f64 {
        if index == 0 {
            self.x
        } else {
            self.y
        }
    }

    fn map_axes(&self, f: impl Fn(usize, f64) -> f64) -> Self {
        Point::new(f(0, self.x), f(1, self.y))
    }
}

/// Identifies one started animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEndReason {
    Finished,
    /// The value was clamped by a bound before the animation completed
    BoundReached,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationResult<V> {
    pub handle: AnimationHandle,
    pub end_reason: AnimationEndReason,
    pub end_value: V,
    /// Velocity at the moment the animation ended, units per second
    pub end_velocity: V,
}

/// Fixed-duration animation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    pub duration_ms: u64,
    pub delay_ms: u64,
    pub easing: Easing,
}

impl TweenSpec {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            easing: Easing::default(),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl From<TweenConfig> for TweenSpec {
    fn from(config: TweenConfig) -> Self {
        TweenSpec::new(config.duration_ms).with_delay(config.delay_ms)
    }
}

#[derive(Debug, Clone, Copy)]
enum Motion<V: AnimationVector> {
    Tween { from: V, to: V, spec: TweenSpec },
    Decay(DecayAnimation<V>),
}

#[derive(Debug, Clone, Copy)]
struct Running<V: AnimationVector> {
    handle: AnimationHandle,
    start_ms: u64,
    motion: Motion<V>,
}

#[derive(Debug, Clone)]
pub struct Animatable<V: AnimationVector> {
    value: V,
    velocity: V,
    lower_bound: Option<V>,
    upper_bound: Option<V>,
    running: Option<Running<V>>,
    next_handle: u64,
}

impl<V: AnimationVector> Animatable<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            velocity: V::ZERO,
            lower_bound: None,
            upper_bound: None,
            running: None,
            next_handle: 0,
        }
    }

    /// Bounds apply per axis; use infinities to leave an axis unbounded
    pub fn with_bounds(mut self, lower: Option<V>, upper: Option<V>) -> Self {
        self.update_bounds(lower, upper);
        self
    }

    /// Replaces the bounds. The current value is not clamped until it next changes.
    pub fn update_bounds(&mut self, lower: Option<V>, upper: Option<V>) {
        self.lower_bound = lower;
        self.upper_bound = upper;
    }

    pub fn value(&self) -> V {
        self.value
    }

    pub fn velocity(&self) -> V {
        self.velocity
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Handle of the animation in flight, if any
    pub fn running_handle(&self) -> Option<AnimationHandle> {
        self.running.map(|running| running.handle)
    }

    /// End value of the running tween, or the resting point of the running decay
    pub fn target_value(&self) -> Option<V> {
        self.running.map(|running| match running.motion {
            Motion::Tween { to, .. } => self.clamp(to),
            Motion::Decay(decay) => self.clamp(decay.target_value()),
        })
    }

    /// Stops any running animation and zeroes the velocity
    pub fn cancel(&mut self) -> Option<AnimationHandle> {
        self.velocity = V::ZERO;
        self.running.take().map(|running| running.handle)
    }

    /// Jumps to `value` (clamped to the bounds), cancelling any running animation
    pub fn snap_to(&mut self, value: V) {
        self.cancel();
        self.value = self.clamp(value);
    }

    /// Eases from the current value to `target`, clamped per axis to the bounds
    pub fn animate_to(&mut self, target: V, spec: TweenSpec, now_ms: u64) -> AnimationHandle {
        let motion = Motion::Tween {
            from: self.value,
            to: self.clamp(target),
            spec,
        };
        self.start(motion, now_ms)
    }

    /// Flings from the current value with `initial_velocity` units per second
    pub fn animate_decay(
        &mut self,
        initial_velocity: V,
        decay: ExponentialDecay,
        now_ms: u64,
    ) -> AnimationHandle {
        let motion = Motion::Decay(DecayAnimation::new(decay, self.value, initial_velocity));
        let handle = self.start(motion, now_ms);
        self.velocity = initial_velocity;
        handle
    }

    fn start(&mut self, motion: Motion<V>, now_ms: u64) -> AnimationHandle {
        self.cancel();
        let handle = AnimationHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.running = Some(Running {
            handle,
            start_ms: now_ms,
            motion,
        });
        handle
    }

    /// Advances the running animation to `now_ms`.
    ///
    /// Returns the result when the animation ends on this tick.
    pub fn tick(&mut self, now_ms: u64) -> Option<AnimationResult<V>> {
        let running = self.running?;
        let elapsed = now_ms.saturating_sub(running.start_ms);

        let (raw_value, velocity, complete) = match running.motion {
            Motion::Tween { from, to, spec } => {
                if elapsed < spec.delay_ms {
                    return None;
                }
                let play = elapsed - spec.delay_ms;
                let fraction = if spec.duration_ms == 0 {
                    1.0
                } else {
                    play as f64 / spec.duration_ms as f64
                };
                let value = if fraction >= 1.0 {
                    to
                } else {
                    from.lerp(&to, spec.easing.apply(fraction))
                };
                let velocity = if fraction >= 1.0 {
                    V::ZERO
                } else {
                    tween_velocity(from, to, spec, play)
                };
                (value, velocity, fraction >= 1.0)
            }
            Motion::Decay(decay) => {
                let play = elapsed.min(decay.duration_ms());
                (
                    decay.value_at(play),
                    decay.velocity_at(play),
                    decay.is_finished_at(elapsed),
                )
            }
        };

        let clamped = self.clamp(raw_value);
        self.value = clamped;
        self.velocity = velocity;

        let end_reason = if clamped != raw_value {
            AnimationEndReason::BoundReached
        } else if complete {
            AnimationEndReason::Finished
        } else {
            return None;
        };

        self.running = None;
        self.velocity = V::ZERO;
        Some(AnimationResult {
            handle: running.handle,
            end_reason,
            end_value: clamped,
            end_velocity: velocity,
        })
    }

    /// True when the axis sits on its lower or upper bound
    pub fn is_at_bound(&self, axis: usize) -> bool {
        let value = self.value.axis(axis);
        self.lower_bound.map_or(false, |lower| value <= lower.axis(axis))
            || self.upper_bound.map_or(false, |upper| value >= upper.axis(axis))
    }

    fn clamp(&self, value: V) -> V {
        let lower = self.lower_bound;
        let upper = self.upper_bound;
        value.map_axes(|axis, v| {
            let v = lower.map_or(v, |lower| v.max(lower.axis(axis)));
            upper.map_or(v, |upper| v.min(upper.axis(axis)))
        })
    }
}

/// Finite-difference velocity of a tween, in units per second
fn tween_velocity<V: AnimationVector>(from: V, to: V, spec: TweenSpec, play_ms: u64) -> V {
    let duration = spec.duration_ms as f64;
    let at = |ms: f64| spec.easing.apply(ms / duration);
    let slope = (at(play_ms as f64 + 1.0) - at(play_ms as f64)) * 1000.0;
    from.map_axes(|axis, start| (to.axis(axis) - start) * slope)
}
