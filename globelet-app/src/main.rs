use anyhow::Context;
use globelet::{
    rendering::camera::ndc_to_screen, CameraPosition, FrameReceiver, Globe, GlobeConfig,
    GlobeListener, GlobeViewState, LatLong, LocationMarkerColors, Marker, Point, PointerBatch,
    PointerEvent,
};
use once_cell::sync::Lazy;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

const FRAME_MS: u64 = 16;
const VIEWPORT: Point = Point { x: 1080.0, y: 1920.0 };

static LOCATIONS: Lazy<Vec<(&'static str, LatLong)>> = Lazy::new(|| {
    vec![
        ("berlin", LatLong::from_degrees(52.52, 13.405)),
        ("nairobi", LatLong::from_degrees(-1.2864, 36.8172)),
        ("new-york", LatLong::from_degrees(40.7128, -74.006)),
        ("san-francisco", LatLong::from_degrees(37.7749, -122.4194)),
        ("tokyo", LatLong::from_degrees(35.6762, 139.6503)),
    ]
});

struct LoggingListener;

impl GlobeListener for LoggingListener {
    fn on_marker_tap(&mut self, marker: &Marker) {
        log::info!("tapped {}", marker.id.as_deref().unwrap_or("?"));
    }

    fn on_marker_long_press(&mut self, position: Point, marker: &Marker) {
        log::info!(
            "long pressed {} at ({:.0}, {:.0})",
            marker.id.as_deref().unwrap_or("?"),
            position.x,
            position.y
        );
    }
}

/// Scripted input, keyed by virtual time in milliseconds
fn script() -> Vec<PointerBatch> {
    let mut batches = vec![PointerBatch::single(500, PointerEvent::down(1, 300.0, 900.0))];
    for step in 1..=10 {
        let x = 300.0 + step as f64 * 40.0;
        batches.push(PointerBatch::single(
            500 + step * FRAME_MS,
            PointerEvent::moved(1, x, 900.0 - step as f64 * 6.0),
        ));
    }
    batches.push(PointerBatch::single(
        500 + 11 * FRAME_MS,
        PointerEvent::up(1, 700.0, 840.0),
    ));
    batches
}

fn view_state(target: LatLong) -> GlobeViewState {
    let markers = LOCATIONS
        .iter()
        .map(|(id, lat_long)| Marker::new(*lat_long, LocationMarkerColors::default()).with_id(*id))
        .collect();
    GlobeViewState {
        camera_position: CameraPosition::new(target),
        markers,
        ..GlobeViewState::default()
    }
}

fn spawn_renderer(frames: FrameReceiver, running: Arc<AtomicBool>) -> std::thread::JoinHandle<u64> {
    std::thread::spawn(move || {
        let mut drawn = 0;
        while running.load(Ordering::Relaxed) {
            match frames.recv_timeout(Duration::from_millis(100)) {
                Ok(Some(snapshot)) => {
                    drawn += 1;
                    let uniforms = snapshot.uniforms();
                    log::trace!(
                        "frame {} camera {:?}, {} of {} markers visible, {} uniform bytes",
                        snapshot.generation,
                        snapshot.camera.lat_long,
                        snapshot.visible_markers().count(),
                        snapshot.markers.len(),
                        std::mem::size_of_val(&uniforms)
                    );
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("renderer stopping: {}", err);
                    break;
                }
            }
        }
        drawn
    })
}

/// Pixel position of a marker in the latest frame, if it is visible
fn marker_on_screen(globe: &Globe, id: &str) -> Option<Point> {
    let snapshot = globe.snapshot()?;
    let screen = snapshot
        .visible_markers()
        .find(|rendered| rendered.marker.id.as_deref() == Some(id))
        .and_then(|rendered| rendered.ndc)
        .map(|ndc| ndc_to_screen(ndc, VIEWPORT));
    screen
}

/// Headless demo session: drag and fling, wait for the snap-back, tap a
/// marker, then recenter on another location
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let (_, home) = LOCATIONS[0];
    let mut globe = Globe::new(view_state(home), GlobeConfig::default())
        .context("creating globe")?
        .with_listener(LoggingListener);
    globe.set_viewport_size(VIEWPORT)?;

    let running = Arc::new(AtomicBool::new(true));
    let frames = globe
        .take_frame_receiver()
        .context("frame receiver already taken")?;
    let renderer = spawn_renderer(frames, running.clone());

    let mut pending = script().into_iter().peekable();
    let mut interval = tokio::time::interval(Duration::from_millis(FRAME_MS));
    let mut now_ms = 0;
    let mut tapped = false;
    let mut recentered = false;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                break;
            }
        }
        now_ms += FRAME_MS;

        while let Some(batch) = pending.next_if(|batch| batch.time_ms <= now_ms) {
            globe.handle_pointer(&batch)?;
        }
        globe.tick(now_ms)?;

        if !tapped && now_ms >= 6_000 {
            tapped = true;
            log::info!("snapped back to {:?}", globe.camera_position().lat_long);
            if let Some(position) = marker_on_screen(&globe, "berlin") {
                let (x, y) = (position.x, position.y);
                globe.handle_pointer(&PointerBatch::single(now_ms, PointerEvent::down(2, x, y)))?;
                globe.handle_pointer(&PointerBatch::single(now_ms, PointerEvent::up(2, x, y)))?;
            }
        }

        if tapped && !recentered && now_ms >= 6_500 {
            recentered = true;
            let (_, destination) = LOCATIONS[4];
            globe.set_view_state_at(view_state(destination), now_ms)?;
        }

        if recentered && !globe.is_animating() {
            log::info!("settled at {:?} after {} ms", globe.camera_position(), now_ms);
            break;
        }
    }

    running.store(false, Ordering::Relaxed);
    let frames = renderer
        .join()
        .map_err(|_| anyhow::anyhow!("renderer thread panicked"))?;
    log::info!("renderer drew {} frames", frames);
    Ok(())
}
