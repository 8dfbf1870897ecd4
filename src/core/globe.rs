use crate::{
    animation::inertia::{InertiaAnimator, InertiaPhase},
    core::{
        config::GlobeConfig,
        geo::Point,
        view_state::{CameraPosition, GlobeViewState, ViewStateChanges},
    },
    input::{
        events::PointerBatch,
        gestures::{GestureDecoder, GestureEvent},
        tap::{TapEvent, TapRecognizer},
    },
    layers::marker::Marker,
    prelude::Arc,
    rendering::{
        camera::CameraModel,
        frame::{FrameReceiver, FrameScheduler, RenderSnapshot, RenderedMarker},
    },
    spatial::index::MarkerIndex,
    Result,
};

/// Callbacks for marker interaction
pub trait GlobeListener: Send {
    fn on_marker_tap(&mut self, _marker: &Marker) {}

    /// `position` is where the pointer went down, in view pixels
    fn on_marker_long_press(&mut self, _position: Point, _marker: &Marker) {}
}

/// Listener that ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl GlobeListener for NoopListener {}

/// The interactive globe.
///
/// Owns the camera, gesture and animation state on a single thread and
/// publishes a [`RenderSnapshot`] whenever something visible changes.
/// Renderers pick snapshots up through [`Globe::take_frame_receiver`]; once
/// every handed out receiver is dropped, publishing fails with
/// [`crate::GlobeError::RenderChannelClosed`].
pub struct Globe {
    view_state: GlobeViewState,
    config: GlobeConfig,
    camera: CameraModel,
    animator: InertiaAnimator,
    decoder: GestureDecoder,
    taps: TapRecognizer,
    markers: MarkerIndex,
    listener: Box<dyn GlobeListener>,
    scheduler: FrameScheduler,
    receiver: Option<FrameReceiver>,
    viewport_size: Point,
    epoch: instant::Instant,
}

impl Globe {
    pub fn new(view_state: GlobeViewState, config: GlobeConfig) -> Result<Self> {
        config.validate()?;
        let camera = CameraModel::new(view_state.camera_position);
        camera.view_projection(1.0)?;

        let (scheduler, receiver) = FrameScheduler::new();
        let mut globe = Self {
            camera,
            animator: InertiaAnimator::new(&view_state.camera_position, &config),
            decoder: GestureDecoder::from_config(&config),
            taps: TapRecognizer::from_config(&config),
            markers: MarkerIndex::new(view_state.markers.clone())
                .with_threshold(config.hit_threshold),
            listener: Box::new(NoopListener),
            scheduler,
            receiver: Some(receiver),
            viewport_size: Point::new(1.0, 1.0),
            epoch: instant::Instant::now(),
            view_state,
            config,
        };
        globe.publish()?;

        #[cfg(feature = "debug")]
        log::debug!(
            "globe created at {:?} with {} markers, interactive: {}",
            globe.camera.position().lat_long,
            globe.markers.len(),
            globe.config.interactive
        );
        Ok(globe)
    }

    pub fn with_listener(mut self, listener: impl GlobeListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn set_listener(&mut self, listener: impl GlobeListener + 'static) {
        self.listener = Box::new(listener);
    }

    /// Milliseconds since this globe was created, for stamping pointer batches and ticks
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    pub fn view_state(&self) -> &GlobeViewState {
        &self.view_state
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GlobeConfig) -> Result<()> {
        config.validate()?;
        self.animator.set_config(&config);
        self.decoder = GestureDecoder::from_config(&config);
        self.taps = TapRecognizer::from_config(&config);
        self.markers.set_threshold(config.hit_threshold);
        self.config = config;
        self.publish()?;
        Ok(())
    }

    /// Where the camera is right now
    pub fn camera_position(&self) -> CameraPosition {
        if self.config.interactive {
            self.animator.camera_position()
        } else {
            self.view_state.camera_position
        }
    }

    pub fn phase(&self) -> InertiaPhase {
        self.animator.phase()
    }

    pub fn is_animating(&self) -> bool {
        self.config.interactive && self.animator.is_animating()
    }

    pub fn viewport_size(&self) -> Point {
        self.viewport_size
    }

    /// Sets the drawable size in pixels. Both sides must be positive.
    pub fn set_viewport_size(&mut self, size: Point) -> Result<()> {
        let previous = self.viewport_size;
        self.viewport_size = size;
        if let Err(err) = self.publish() {
            self.viewport_size = previous;
            return Err(err);
        }
        Ok(())
    }

    /// [`Globe::set_view_state_at`] stamped with [`Globe::now_ms`]
    pub fn set_view_state(&mut self, view_state: GlobeViewState) -> Result<()> {
        let now_ms = self.now_ms();
        self.set_view_state_at(view_state, now_ms)
    }

    /// Applies a new view state from the host.
    ///
    /// A changed target location starts a recenter animation. Zoom, bias and
    /// field of view changes update the framing. Marker and color changes
    /// only publish a new frame.
    pub fn set_view_state_at(&mut self, view_state: GlobeViewState, now_ms: u64) -> Result<()> {
        let changes = ViewStateChanges::between(&self.view_state, &view_state);
        if !changes.any() {
            return Ok(());
        }
        CameraModel::new(view_state.camera_position).view_projection(1.0)?;
        self.view_state = view_state;

        if changes.markers {
            self.markers.set_markers(self.view_state.markers.clone());
        }

        let camera = self.view_state.camera_position;
        if !self.config.interactive {
            self.animator.jump_to(&camera);
        } else {
            if changes.framing {
                self.animator.set_framing(&camera);
            }
            if changes.target {
                self.animator.set_target(camera.lat_long, now_ms);
            }
        }

        #[cfg(feature = "debug")]
        log::debug!("view state updated: {:?}", changes);

        self.publish()?;
        Ok(())
    }

    /// Feeds one batch of pointer events through tap recognition and,
    /// in interactive mode, the gesture decoder.
    pub fn handle_pointer(&mut self, batch: &PointerBatch) -> Result<()> {
        for event in self.taps.process(batch) {
            self.on_tap_event(event);
        }

        if !self.config.interactive {
            return Ok(());
        }

        let events = self.decoder.process(batch);
        if events.is_empty() {
            return Ok(());
        }
        for event in events {
            match event {
                GestureEvent::Start => self.animator.on_gesture_start(),
                GestureEvent::Transform(delta) => self.animator.on_gesture(&delta, batch.time_ms),
                GestureEvent::End => self.animator.on_gesture_end(batch.time_ms),
            }
        }
        self.publish()?;
        Ok(())
    }

    /// Advances animations and pending long presses to `now_ms`.
    ///
    /// Returns true when the camera moved and a new frame was published.
    pub fn tick(&mut self, now_ms: u64) -> Result<bool> {
        if let Some(event) = self.taps.tick(now_ms) {
            self.on_tap_event(event);
        }

        if !self.config.interactive || !self.animator.tick(now_ms) {
            return Ok(false);
        }
        self.publish()?;
        Ok(true)
    }

    /// Stops frame requests, e.g. while the host is in the background
    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) -> Result<bool> {
        self.scheduler.resume()
    }

    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// Most recently published snapshot
    pub fn snapshot(&self) -> Option<Arc<RenderSnapshot>> {
        self.scheduler.latest()
    }

    /// Receiver for frame requests, to be moved to the render thread.
    ///
    /// Handed out once; later calls return `None`.
    pub fn take_frame_receiver(&mut self) -> Option<FrameReceiver> {
        self.receiver.take()
    }

    fn on_tap_event(&mut self, event: TapEvent) {
        match event {
            TapEvent::Tap { position } => {
                if let Some(hit) = self.hit_test(position) {
                    #[cfg(feature = "debug")]
                    log::debug!("marker {:?} tapped", hit.id);
                    self.listener.on_marker_tap(&hit);
                }
            }
            TapEvent::LongPress { position } => {
                if let Some(hit) = self.hit_test(position) {
                    #[cfg(feature = "debug")]
                    log::debug!("marker {:?} long pressed", hit.id);
                    self.listener.on_marker_long_press(position, &hit);
                }
            }
            TapEvent::DoubleTap { .. } => {}
        }
    }

    fn hit_test(&mut self, position: Point) -> Option<Marker> {
        self.camera.set_position(self.camera_position());
        self.markers
            .nearest_on_screen(position, self.viewport_size, &self.camera)
            .map(|hit| hit.marker)
    }

    fn publish(&mut self) -> Result<bool> {
        self.camera.set_position(self.camera_position());
        let view_projection = self
            .camera
            .view_projection(self.viewport_size.x / self.viewport_size.y)?;

        let markers = self
            .markers
            .markers()
            .iter()
            .zip(self.markers.project_all(&self.camera, &view_projection))
            .map(|(marker, ndc)| RenderedMarker {
                marker: marker.clone(),
                ndc,
            })
            .collect();

        let snapshot = RenderSnapshot {
            generation: self.scheduler.next_generation(),
            camera: *self.camera.position(),
            view_projection,
            colors: self.view_state.colors,
            markers,
            sphere: *self.camera.sphere(),
        };
        self.scheduler.publish(snapshot)
    }
}

impl std::fmt::Debug for Globe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Globe")
            .field("camera", &self.camera_position())
            .field("phase", &self.animator.phase())
            .field("markers", &self.markers.len())
            .field("viewport_size", &self.viewport_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{colors::LocationMarkerColors, geo::LatLong};
    use crate::input::events::PointerEvent;
    use crate::GlobeError;
    use std::sync::Mutex;

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl GlobeListener for Recorder {
        fn on_marker_tap(&mut self, marker: &Marker) {
            let id = marker.id.clone().unwrap_or_default();
            self.0.lock().unwrap().push(format!("tap:{id}"));
        }

        fn on_marker_long_press(&mut self, _position: Point, marker: &Marker) {
            let id = marker.id.clone().unwrap_or_default();
            self.0.lock().unwrap().push(format!("long:{id}"));
        }
    }

    fn view_state() -> GlobeViewState {
        let marker = Marker::new(LatLong::default(), LocationMarkerColors::default()).with_id("home");
        GlobeViewState {
            markers: vec![marker],
            ..GlobeViewState::default()
        }
    }

    fn globe(config: GlobeConfig) -> Globe {
        let mut globe = Globe::new(view_state(), config).unwrap();
        globe.set_viewport_size(Point::new(1080.0, 1920.0)).unwrap();
        globe
    }

    #[test]
    fn test_new_publishes_first_frame() {
        let mut globe = globe(GlobeConfig::default());
        let snapshot = globe.take_frame_receiver().unwrap().try_recv().unwrap();
        assert_eq!(snapshot.markers.len(), 1);
        assert!(snapshot.markers[0].ndc.is_some());
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let config = GlobeConfig {
            touch_slop: 0.0,
            ..GlobeConfig::default()
        };
        assert!(matches!(
            Globe::new(view_state(), config),
            Err(GlobeError::InvalidConfig(_))
        ));

        let mut state = view_state();
        state.camera_position.field_of_view = 180.0;
        assert!(matches!(
            Globe::new(state, GlobeConfig::default()),
            Err(GlobeError::InvalidCamera(_))
        ));

        let mut globe = globe(GlobeConfig::default());
        assert!(globe.set_viewport_size(Point::new(0.0, 100.0)).is_err());
        assert_eq!(globe.viewport_size(), Point::new(1080.0, 1920.0));
    }

    #[test]
    fn test_tap_on_marker_reaches_listener() {
        let recorder = Recorder::default();
        let mut globe = globe(GlobeConfig::default()).with_listener(recorder.clone());
        globe
            .handle_pointer(&PointerBatch::single(0, PointerEvent::down(1, 540.0, 960.0)))
            .unwrap();
        globe
            .handle_pointer(&PointerBatch::single(80, PointerEvent::up(1, 541.0, 960.0)))
            .unwrap();
        globe
            .handle_pointer(&PointerBatch::single(2_000, PointerEvent::down(2, 10.0, 10.0)))
            .unwrap();
        globe
            .handle_pointer(&PointerBatch::single(2_050, PointerEvent::up(2, 10.0, 10.0)))
            .unwrap();
        assert_eq!(recorder.calls(), vec!["tap:home".to_string()]);
    }

    #[test]
    fn test_long_press_on_marker() {
        let recorder = Recorder::default();
        let mut globe = globe(GlobeConfig::default()).with_listener(recorder.clone());
        globe
            .handle_pointer(&PointerBatch::single(0, PointerEvent::down(1, 540.0, 960.0)))
            .unwrap();
        globe.tick(600).unwrap();
        assert_eq!(recorder.calls(), vec!["long:home".to_string()]);
    }

    #[test]
    fn test_target_change_recenters() {
        let mut globe = globe(GlobeConfig::default());
        let mut state = globe.view_state().clone();
        state.camera_position.lat_long = LatLong::from_degrees(30.0, 45.0);
        globe.set_view_state_at(state, 0).unwrap();
        assert_eq!(globe.phase(), InertiaPhase::Recentering);

        assert!(globe.tick(1_000).unwrap());
        globe.tick(5_000).unwrap();
        let camera = globe.camera_position();
        assert!((camera.lat_long.latitude.value() - 30.0).abs() < 1e-9);
        assert!((camera.lat_long.longitude.value() - 45.0).abs() < 1e-9);
        assert_eq!(camera.zoom, 1.2);
        assert_eq!(globe.phase(), InertiaPhase::Idle);
    }

    #[test]
    fn test_marker_change_does_not_recenter() {
        let mut globe = globe(GlobeConfig::default());
        let receiver = globe.take_frame_receiver().unwrap();
        while receiver.try_recv().is_some() {}

        let mut state = globe.view_state().clone();
        state.markers.clear();
        globe.set_view_state_at(state.clone(), 0).unwrap();
        assert_eq!(globe.phase(), InertiaPhase::Idle);
        assert!(receiver.try_recv().unwrap().markers.is_empty());

        // Same state again is a no-op
        globe.set_view_state_at(state, 10).unwrap();
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_static_mode_follows_host_camera() {
        let config = GlobeConfig {
            interactive: false,
            ..GlobeConfig::default()
        };
        let mut globe = globe(config);
        let mut state = globe.view_state().clone();
        state.camera_position.lat_long = LatLong::from_degrees(80.0, 10.0);
        globe.set_view_state_at(state.clone(), 0).unwrap();
        assert_eq!(globe.camera_position(), state.camera_position);

        globe
            .handle_pointer(&PointerBatch::single(0, PointerEvent::down(1, 100.0, 100.0)))
            .unwrap();
        globe
            .handle_pointer(&PointerBatch::single(16, PointerEvent::moved(1, 400.0, 100.0)))
            .unwrap();
        assert!(!globe.tick(32).unwrap());
        assert_eq!(globe.camera_position(), state.camera_position);
    }

    #[test]
    fn test_paused_globe_replays_one_frame() {
        let mut globe = globe(GlobeConfig::default());
        let receiver = globe.take_frame_receiver().unwrap();
        while receiver.try_recv().is_some() {}

        globe.pause();
        let mut state = globe.view_state().clone();
        state.markers.clear();
        globe.set_view_state_at(state, 0).unwrap();
        assert!(receiver.try_recv().is_none());

        assert!(globe.resume().unwrap());
        assert!(receiver.try_recv().is_some());
    }

    #[test]
    fn test_frame_receiver_is_handed_out_once() {
        let mut globe = globe(GlobeConfig::default());
        assert!(globe.take_frame_receiver().is_some());
        assert!(globe.take_frame_receiver().is_none());
    }

    #[test]
    fn test_dropped_renderer_closes_channel() {
        let mut globe = globe(GlobeConfig::default());
        drop(globe.take_frame_receiver());

        assert!(matches!(
            globe.set_viewport_size(Point::new(720.0, 1280.0)),
            Err(GlobeError::RenderChannelClosed)
        ));
        assert!(matches!(
            globe.handle_pointer(&PointerBatch::single(0, PointerEvent::down(1, 100.0, 100.0))),
            Err(GlobeError::RenderChannelClosed)
        ));
    }
}
