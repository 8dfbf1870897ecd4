//! Hand-off between the interaction thread and the renderer
//!
//! The owner of the globe publishes an immutable [`RenderSnapshot`] after
//! every state change and requests a frame. Requests go through a channel of
//! capacity one, so a burst of changes collapses into a single pending frame
//! and the renderer always draws the newest snapshot.

use crate::core::{
    colors::{Color, GlobeColors},
    constants::LAND_OCEAN_SCALE_FACTOR,
    geo::Point,
    view_state::CameraPosition,
};
use crate::layers::marker::Marker;
use crate::prelude::{Arc, Duration, Mutex};
use crate::rendering::camera::{to_gpu_matrix, Sphere, ViewProjection};
use crate::{GlobeError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

/// Per-frame uniform block for the contour, land and ocean passes
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobeUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub land_color: [f32; 4],
    pub ocean_color: [f32; 4],
    pub contour_color: [f32; 4],
    /// Land and ocean are drawn this much inside the contour lines
    pub land_ocean_scale: f32,
    pub _pad0: [f32; 3],
}

/// Per-marker instance data
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerInstance {
    pub center: [f32; 3],
    pub size: f32,
    pub center_color: [f32; 4],
    pub ring_border_color: [f32; 4],
    pub shadow_color: [f32; 4],
    /// Fully transparent when the marker has no perimeter
    pub perimeter_color: [f32; 4],
}

impl MarkerInstance {
    pub fn from_marker(marker: &Marker, sphere: &Sphere) -> Self {
        let center = sphere.surface_point(&marker.lat_long);
        let colors = &marker.colors;
        Self {
            center: [center.x as f32, center.y as f32, center.z as f32],
            size: marker.size as f32,
            center_color: colors.center.to_array(),
            ring_border_color: colors.ring_border.to_array(),
            shadow_color: colors.shadow.to_array(),
            perimeter_color: colors
                .perimeter
                .unwrap_or(Color::BLACK.with_alpha(0.0))
                .to_array(),
        }
    }
}

/// A marker together with where it lands on screen this frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub marker: Marker,
    /// Normalized device coordinates, `None` on the far side of the globe
    pub ndc: Option<Point>,
}

/// Everything the renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    /// Increases with every published snapshot
    pub generation: u64,
    pub camera: CameraPosition,
    pub view_projection: ViewProjection,
    pub colors: GlobeColors,
    pub markers: Vec<RenderedMarker>,
    pub sphere: Sphere,
}

impl RenderSnapshot {
    pub fn uniforms(&self) -> GlobeUniforms {
        GlobeUniforms {
            view: to_gpu_matrix(&self.view_projection.view),
            projection: to_gpu_matrix(&self.view_projection.projection),
            land_color: self.colors.land.to_array(),
            ocean_color: self.colors.ocean.to_array(),
            contour_color: self.colors.contour.to_array(),
            land_ocean_scale: LAND_OCEAN_SCALE_FACTOR,
            _pad0: [0.0; 3],
        }
    }

    pub fn marker_instances(&self) -> Vec<MarkerInstance> {
        self.markers
            .iter()
            .map(|rendered| MarkerInstance::from_marker(&rendered.marker, &self.sphere))
            .collect()
    }

    pub fn visible_markers(&self) -> impl Iterator<Item = &RenderedMarker> {
        self.markers.iter().filter(|rendered| rendered.ndc.is_some())
    }
}

type SnapshotSlot = Arc<Mutex<Option<Arc<RenderSnapshot>>>>;

fn load(slot: &SnapshotSlot) -> Option<Arc<RenderSnapshot>> {
    slot.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Owner side: publishes snapshots and requests frames
#[derive(Debug)]
pub struct FrameScheduler {
    requests: Sender<u64>,
    slot: SnapshotSlot,
    generation: u64,
    paused: bool,
    pending_while_paused: bool,
}

/// Renderer side: waits for frame requests and reads the newest snapshot
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    requests: Receiver<u64>,
    slot: SnapshotSlot,
}

impl FrameScheduler {
    pub fn new() -> (FrameScheduler, FrameReceiver) {
        let (tx, rx) = bounded(1);
        let slot: SnapshotSlot = Arc::new(Mutex::new(None));
        let scheduler = FrameScheduler {
            requests: tx,
            slot: slot.clone(),
            generation: 0,
            paused: false,
            pending_while_paused: false,
        };
        (scheduler, FrameReceiver { requests: rx, slot })
    }

    /// Generation number the next published snapshot should carry
    pub fn next_generation(&self) -> u64 {
        self.generation + 1
    }

    /// Stores `snapshot` as the newest state and requests a frame for it
    pub fn publish(&mut self, snapshot: RenderSnapshot) -> Result<bool> {
        self.generation = snapshot.generation.max(self.generation + 1);
        *self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(snapshot));
        self.request_frame()
    }

    pub fn latest(&self) -> Option<Arc<RenderSnapshot>> {
        load(&self.slot)
    }

    /// Asks the renderer for a frame.
    ///
    /// Returns `Ok(true)` when a new request was queued and `Ok(false)` when it
    /// merged into a pending one or was held back because rendering is paused.
    pub fn request_frame(&mut self) -> Result<bool> {
        if self.paused {
            self.pending_while_paused = true;
            #[cfg(feature = "debug")]
            log::trace!("frame request {} suppressed while paused", self.generation);
            return Ok(false);
        }

        match self.requests.try_send(self.generation) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(GlobeError::RenderChannelClosed),
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes rendering, issuing one frame request if anything changed while paused
    pub fn resume(&mut self) -> Result<bool> {
        self.paused = false;
        if std::mem::take(&mut self.pending_while_paused) {
            self.request_frame()
        } else {
            Ok(false)
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl FrameReceiver {
    /// Blocks until a frame is requested and returns the newest snapshot
    pub fn recv(&self) -> Result<Arc<RenderSnapshot>> {
        loop {
            self.requests
                .recv()
                .map_err(|_| GlobeError::RenderChannelClosed)?;
            if let Some(snapshot) = load(&self.slot) {
                return Ok(snapshot);
            }
        }
    }

    /// Like [`FrameReceiver::recv`], giving up after `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Arc<RenderSnapshot>>> {
        match self.requests.recv_timeout(timeout) {
            Ok(_) => Ok(load(&self.slot)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(GlobeError::RenderChannelClosed),
        }
    }

    /// Takes a pending frame request without blocking
    pub fn try_recv(&self) -> Option<Arc<RenderSnapshot>> {
        self.requests.try_recv().ok().and_then(|_| load(&self.slot))
    }

    pub fn latest(&self) -> Option<Arc<RenderSnapshot>> {
        load(&self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{colors::LocationMarkerColors, geo::LatLong};
    use crate::rendering::camera::CameraModel;

    fn snapshot(generation: u64) -> RenderSnapshot {
        let camera = CameraModel::default();
        let marker = Marker::new(LatLong::default(), LocationMarkerColors::default()).with_id("a");
        RenderSnapshot {
            generation,
            camera: *camera.position(),
            view_projection: camera.view_projection(1.0).unwrap(),
            colors: GlobeColors::default(),
            markers: vec![RenderedMarker {
                marker,
                ndc: Some(Point::ZERO),
            }],
            sphere: Sphere::unit(),
        }
    }

    #[test]
    fn test_requests_coalesce() {
        let (mut scheduler, receiver) = FrameScheduler::new();
        assert!(scheduler.publish(snapshot(1)).unwrap());
        assert!(!scheduler.publish(snapshot(2)).unwrap());
        assert!(!scheduler.publish(snapshot(3)).unwrap());

        let frame = receiver.try_recv().unwrap();
        assert_eq!(frame.generation, 3);
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_paused_requests_replay_once_on_resume() {
        let (mut scheduler, receiver) = FrameScheduler::new();
        scheduler.pause();
        assert!(!scheduler.publish(snapshot(1)).unwrap());
        assert!(!scheduler.publish(snapshot(2)).unwrap());
        assert!(receiver.try_recv().is_none());

        assert!(scheduler.resume().unwrap());
        assert_eq!(receiver.try_recv().unwrap().generation, 2);
        assert!(!scheduler.resume().unwrap());
    }

    #[test]
    fn test_closed_renderer_is_reported() {
        let (mut scheduler, receiver) = FrameScheduler::new();
        drop(receiver);
        assert!(matches!(
            scheduler.publish(snapshot(1)),
            Err(GlobeError::RenderChannelClosed)
        ));
    }

    #[test]
    fn test_uniform_layout() {
        let frame = snapshot(1);
        let uniforms = frame.uniforms();
        assert_eq!(std::mem::size_of::<GlobeUniforms>(), 192);
        assert_eq!(uniforms.land_ocean_scale, 0.99999);
        assert_eq!(uniforms.land_color, GlobeColors::default().land.to_array());
        let bytes: &[u8] = bytemuck::bytes_of(&uniforms);
        assert_eq!(bytes.len(), 192);
    }

    #[test]
    fn test_marker_instances() {
        let frame = snapshot(1);
        let instances = frame.marker_instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].center, [0.0, 0.0, 1.0]);
        assert_eq!(instances[0].perimeter_color[3], 0.4);
        assert_eq!(std::mem::size_of::<MarkerInstance>(), 80);
        assert_eq!(frame.visible_markers().count(), 1);
    }

    #[test]
    fn test_renderer_thread_sees_latest_snapshot() {
        let (mut scheduler, receiver) = FrameScheduler::new();
        let renderer = std::thread::spawn(move || receiver.recv().map(|frame| frame.generation));
        scheduler.publish(snapshot(7)).unwrap();
        assert_eq!(renderer.join().unwrap().unwrap(), 7);
    }
}
