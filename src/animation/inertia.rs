use crate::animation::animatable::{
    Animatable, AnimationEndReason, AnimationResult, AnimationVector, TweenSpec,
};
use crate::animation::decay::ExponentialDecay;
use crate::animation::velocity::DiffVelocityTracker;
use crate::core::config::GlobeConfig;
use crate::core::constants::DECAY_VELOCITY_THRESHOLD;
use crate::core::geo::{shortest_target, LatLong, Latitude, Longitude, Point};
use crate::core::view_state::CameraPosition;
use crate::input::gestures::GestureDelta;

/// What is currently moving the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertiaPhase {
    Idle,
    /// A gesture is in progress and drives the camera directly
    Dragging,
    /// Released with velocity, decaying
    Flinging,
    /// Waiting for, or running, the ease back to the selected location
    SnappingBack,
    /// Easing to a newly selected location
    Recentering,
}

/// Turns gestures into camera motion.
///
/// The camera location lives in unwrapped lat/long space (`x` = longitude,
/// `y` = latitude) so flings can spin across the antimeridian without jumps.
/// Latitude is bounded by the configured range, longitude is free.
#[derive(Debug, Clone)]
pub struct InertiaAnimator {
    offset: Animatable<Point>,
    zoom: Animatable<f64>,
    tracker: DiffVelocityTracker,
    config: GlobeConfig,
    target: LatLong,
    framing: CameraPosition,
    phase: InertiaPhase,
}

impl InertiaAnimator {
    pub fn new(camera: &CameraPosition, config: &GlobeConfig) -> Self {
        let mut animator = Self {
            offset: Animatable::new(camera.lat_long.to_offset()),
            zoom: Animatable::new(camera.zoom),
            tracker: DiffVelocityTracker::new(),
            config: config.clone(),
            target: camera.lat_long,
            framing: *camera,
            phase: InertiaPhase::Idle,
        };
        animator.apply_bounds();
        animator.offset.snap_to(camera.lat_long.to_offset());
        animator.zoom.snap_to(camera.zoom);
        animator
    }

    pub fn set_config(&mut self, config: &GlobeConfig) {
        self.config = config.clone();
        self.apply_bounds();
    }

    fn apply_bounds(&mut self) {
        let latitudes = self.config.latitude_range;
        self.offset.update_bounds(
            Some(Point::new(f64::NEG_INFINITY, latitudes.min)),
            Some(Point::new(f64::INFINITY, latitudes.max)),
        );
        let zooms = self.config.zoom_range;
        self.zoom.update_bounds(Some(zooms.min), Some(zooms.max));
    }

    pub fn phase(&self) -> InertiaPhase {
        self.phase
    }

    pub fn target(&self) -> LatLong {
        self.target
    }

    /// Unwrapped camera location
    pub fn offset(&self) -> Point {
        self.offset.value()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.value()
    }

    /// Current velocity of the camera location, degrees per second
    pub fn velocity(&self) -> Point {
        self.offset.velocity()
    }

    pub fn is_animating(&self) -> bool {
        self.offset.is_running() || self.zoom.is_running()
    }

    /// Keeps vertical bias and field of view for the camera positions this animator produces
    pub fn set_framing(&mut self, framing: &CameraPosition) {
        self.framing = *framing;
    }

    pub fn camera_position(&self) -> CameraPosition {
        CameraPosition {
            lat_long: LatLong::from_offset(self.offset.value()),
            zoom: self.zoom.value(),
            ..self.framing
        }
    }

    /// Converts a pan in pixels into a lat/long offset at the given zoom.
    ///
    /// Dragging right moves the view west, dragging down moves it north.
    pub fn pan_to_offset(&self, pan: Point, zoom: f64) -> Point {
        let sensitivity = self.config.pan_sensitivity;
        Point::new(-pan.x * zoom * sensitivity.x, pan.y * zoom * sensitivity.y)
    }

    pub fn on_gesture_start(&mut self) {
        self.offset.cancel();
        self.zoom.cancel();
        self.tracker.reset_tracking();
        self.phase = InertiaPhase::Dragging;

        #[cfg(feature = "debug")]
        log::debug!("gesture start at {:?}, zoom {:.3}", self.offset.value(), self.zoom.value());
    }

    pub fn on_gesture(&mut self, delta: &GestureDelta, time_ms: u64) {
        self.phase = InertiaPhase::Dragging;
        let zoom = self.zoom.value();

        let offset_delta = self.pan_to_offset(delta.pan, zoom);
        self.offset.snap_to(self.offset.value().add(&offset_delta));

        if delta.zoom_change != 1.0 {
            let new_zoom = zoom + (1.0 - delta.zoom_change) * self.config.zoom_sensitivity;
            self.zoom.snap_to(new_zoom);
            // Pinch frames would distort the fling velocity
            self.tracker.reset_tracking();
        } else {
            self.tracker.add_data_point(time_ms, offset_delta);
        }
    }

    pub fn on_gesture_end(&mut self, time_ms: u64) {
        let velocity = self.tracker.calculate_velocity(self.config.max_fling_velocity);
        self.tracker.reset_tracking();

        #[cfg(feature = "debug")]
        log::debug!("gesture end, fling velocity {:?}", velocity);

        self.phase = InertiaPhase::Flinging;
        let decay = self.decay();
        self.offset.animate_decay(velocity, decay, time_ms);
    }

    /// Selects a new location and eases the camera to it.
    ///
    /// The location is first unwound so the camera never spins through
    /// extra turns accumulated by earlier flings.
    pub fn set_target(&mut self, target: LatLong, now_ms: u64) {
        self.target = target;

        let current = self.offset.value();
        let distance = target.arc_distance_to(&LatLong::from_offset(current));
        let duration_ms = self.config.recenter.duration_ms(distance);

        let unwound = Point::new(Longitude::unwind(current.x), Latitude::unwind(current.y));
        self.offset.snap_to(unwound);
        self.tracker.reset_tracking();

        let spec = TweenSpec::new(duration_ms);
        let destination = self.closest_target_offset();
        self.offset.animate_to(destination, spec, now_ms);
        self.zoom.animate_to(self.config.zoom_range.min, spec, now_ms);
        self.phase = InertiaPhase::Recentering;

        #[cfg(feature = "debug")]
        log::debug!(
            "recentering to {:?} over {} ms ({:.1} degrees)",
            target,
            duration_ms,
            distance
        );
    }

    /// Moves the camera without animating, as in static mode
    pub fn jump_to(&mut self, camera: &CameraPosition) {
        self.target = camera.lat_long;
        self.framing = *camera;
        self.offset.snap_to(camera.lat_long.to_offset());
        self.zoom.snap_to(camera.zoom);
        self.tracker.reset_tracking();
        self.phase = InertiaPhase::Idle;
    }

    /// Advances every animation to `now_ms`. Returns true when the camera moved.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let before = (self.offset.value(), self.zoom.value());

        if let Some(result) = self.offset.tick(now_ms) {
            self.on_offset_animation_end(result, now_ms);
        }
        self.zoom.tick(now_ms);

        if matches!(
            self.phase,
            InertiaPhase::SnappingBack | InertiaPhase::Recentering
        ) && !self.is_animating()
        {
            self.phase = InertiaPhase::Idle;
        }

        before != (self.offset.value(), self.zoom.value())
    }

    fn on_offset_animation_end(&mut self, result: AnimationResult<Point>, now_ms: u64) {
        if self.phase != InertiaPhase::Flinging {
            return;
        }

        if result.end_reason == AnimationEndReason::BoundReached {
            // Drop the velocity of the axis that hit its bound and keep flinging with the rest
            let offset = &self.offset;
            let remaining = result.end_velocity.map_axes(|axis, velocity| {
                if offset.is_at_bound(axis) {
                    0.0
                } else {
                    velocity
                }
            });

            #[cfg(feature = "debug")]
            log::debug!(
                "fling reached bound at {:?}, continuing with {:?}",
                result.end_value,
                remaining
            );

            if remaining.x.abs() > DECAY_VELOCITY_THRESHOLD
                || remaining.y.abs() > DECAY_VELOCITY_THRESHOLD
            {
                let decay = self.decay();
                self.offset.animate_decay(remaining, decay, now_ms);
                return;
            }
        }

        self.schedule_snap_back(now_ms);
    }

    fn schedule_snap_back(&mut self, now_ms: u64) {
        let spec = TweenSpec::from(self.config.snap_back);
        let destination = self.closest_target_offset();
        self.offset.animate_to(destination, spec, now_ms);
        self.zoom.animate_to(self.config.zoom_range.min, spec, now_ms);
        self.phase = InertiaPhase::SnappingBack;

        #[cfg(feature = "debug")]
        log::debug!(
            "snap-back to {:?} in {} ms, after {} ms",
            destination,
            spec.duration_ms,
            spec.delay_ms
        );
    }

    fn closest_target_offset(&self) -> Point {
        let target = self.target.to_offset();
        Point::new(shortest_target(self.offset.value().x, target.x), target.y)
    }

    fn decay(&self) -> ExponentialDecay {
        ExponentialDecay::with_friction_multiplier(self.config.fling_friction)
    }
}
