use crate::{
    core::{config::GlobeConfig, geo::Point},
    input::events::{PointerBatch, PointerPhase},
    prelude::HashMap,
};

/// One frame of interpreted multi-touch input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureDelta {
    /// Centroid of the pointers before this frame, in view pixels
    pub centroid: Point,
    /// Centroid movement in pixels
    pub pan: Point,
    /// Ratio of the pointers' spread now to their spread before; 1 means no zoom
    pub zoom_change: f64,
    /// Rotation in degrees; 0 means no rotation
    pub rotation: f64,
}

impl GestureDelta {
    pub fn is_neutral(&self) -> bool {
        self.pan == Point::ZERO && self.zoom_change == 1.0 && self.rotation == 0.0
    }
}

/// Events produced by the [`GestureDecoder`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// The first pointer went down
    Start,
    Transform(GestureDelta),
    /// The last pointer went up or the gesture was cancelled
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    /// Pointers are down but have not moved past the touch slop yet
    Tracking,
    Active,
}

/// Decomposes multi-touch pointer batches into pan, zoom and rotation
#[derive(Debug, Clone)]
pub struct GestureDecoder {
    pub enabled: bool,
    touch_slop: f64,
    pan_zoom_lock: bool,
    pointers: HashMap<u64, Point>,
    state: DecoderState,
    accumulated_zoom: f64,
    accumulated_rotation: f64,
    accumulated_pan: Point,
    locked_to_pan_zoom: bool,
}

impl GestureDecoder {
    pub fn new(touch_slop: f64, pan_zoom_lock: bool) -> Self {
        Self {
            enabled: true,
            touch_slop,
            pan_zoom_lock,
            pointers: HashMap::default(),
            state: DecoderState::Idle,
            accumulated_zoom: 1.0,
            accumulated_rotation: 0.0,
            accumulated_pan: Point::ZERO,
            locked_to_pan_zoom: false,
        }
    }

    pub fn from_config(config: &GlobeConfig) -> Self {
        Self::new(config.touch_slop, config.pan_zoom_lock)
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// True once the gesture moved past the touch slop
    pub fn is_active(&self) -> bool {
        self.state == DecoderState::Active
    }

    /// Forgets all pointers without emitting anything
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.state = DecoderState::Idle;
    }

    /// Processes one batch of pointer changes and returns the recognized gesture events
    pub fn process(&mut self, batch: &PointerBatch) -> Vec<GestureEvent> {
        let mut output_events = Vec::new();
        if !self.enabled {
            return output_events;
        }

        if batch.is_cancel() {
            self.finish(&mut output_events);
            return output_events;
        }

        let previous = self.pointers.clone();
        for event in &batch.events {
            match event.phase {
                PointerPhase::Down => {
                    self.pointers.insert(event.id, event.position);
                }
                PointerPhase::Move => {
                    // Moves only update pointers that went down while we were listening
                    if let Some(position) = self.pointers.get_mut(&event.id) {
                        *position = event.position;
                    }
                }
                PointerPhase::Up => {
                    self.pointers.remove(&event.id);
                }
                PointerPhase::Cancel => {}
            }
        }

        if self.state == DecoderState::Idle {
            if self.pointers.is_empty() {
                return output_events;
            }
            self.begin(&mut output_events);
        }

        let frame = FrameChange::between(&previous, &self.pointers);
        self.update(frame, &mut output_events);

        if self.pointers.is_empty() {
            self.finish(&mut output_events);
        }
        output_events
    }

    fn begin(&mut self, output_events: &mut Vec<GestureEvent>) {
        self.state = DecoderState::Tracking;
        self.accumulated_zoom = 1.0;
        self.accumulated_rotation = 0.0;
        self.accumulated_pan = Point::ZERO;
        self.locked_to_pan_zoom = false;
        output_events.push(GestureEvent::Start);
    }

    fn update(&mut self, frame: FrameChange, output_events: &mut Vec<GestureEvent>) {
        if self.state == DecoderState::Tracking {
            self.accumulated_zoom *= frame.zoom;
            self.accumulated_rotation += frame.rotation;
            self.accumulated_pan = self.accumulated_pan.add(&frame.pan);

            let size = frame.previous_size;
            let zoom_motion = (1.0 - self.accumulated_zoom).abs() * size;
            let rotation_motion = (self.accumulated_rotation.to_radians() * size).abs();
            let pan_motion = self.accumulated_pan.length();

            if zoom_motion > self.touch_slop
                || rotation_motion > self.touch_slop
                || pan_motion > self.touch_slop
            {
                self.state = DecoderState::Active;
                self.locked_to_pan_zoom = self.pan_zoom_lock && rotation_motion < self.touch_slop;

                #[cfg(feature = "debug")]
                log::debug!(
                    "gesture past touch slop (pan {:.1}, zoom {:.1}, rotation {:.1}), locked to pan/zoom: {}",
                    pan_motion,
                    zoom_motion,
                    rotation_motion,
                    self.locked_to_pan_zoom
                );
            }
        }

        if self.state == DecoderState::Active {
            let delta = GestureDelta {
                centroid: frame.previous_centroid,
                pan: frame.pan,
                zoom_change: frame.zoom,
                rotation: if self.locked_to_pan_zoom {
                    0.0
                } else {
                    frame.rotation
                },
            };
            if !delta.is_neutral() {
                output_events.push(GestureEvent::Transform(delta));
            }
        }
    }

    fn finish(&mut self, output_events: &mut Vec<GestureEvent>) {
        self.pointers.clear();
        if self.state != DecoderState::Idle {
            self.state = DecoderState::Idle;
            output_events.push(GestureEvent::End);
        }
    }
}

/// Change of the pointers pressed both before and after a batch
#[derive(Debug, Clone, Copy)]
struct FrameChange {
    pan: Point,
    zoom: f64,
    rotation: f64,
    previous_centroid: Point,
    previous_size: f64,
}

impl FrameChange {
    fn between(previous: &HashMap<u64, Point>, current: &HashMap<u64, Point>) -> Self {
        let pairs: Vec<(Point, Point)> = previous
            .iter()
            .filter_map(|(id, before)| current.get(id).map(|after| (*before, *after)))
            .collect();

        if pairs.is_empty() {
            return Self {
                pan: Point::ZERO,
                zoom: 1.0,
                rotation: 0.0,
                previous_centroid: Point::ZERO,
                previous_size: 0.0,
            };
        }

        let previous_centroid = centroid(pairs.iter().map(|(before, _)| *before));
        let current_centroid = centroid(pairs.iter().map(|(_, after)| *after));
        let previous_size = centroid_size(pairs.iter().map(|(before, _)| *before), previous_centroid);
        let current_size = centroid_size(pairs.iter().map(|(_, after)| *after), current_centroid);

        let zoom = if previous_size == 0.0 {
            1.0
        } else {
            current_size / previous_size
        };

        Self {
            pan: current_centroid.subtract(&previous_centroid),
            zoom,
            rotation: rotation(&pairs, previous_centroid, current_centroid),
            previous_centroid,
            previous_size,
        }
    }
}

fn centroid(points: impl Iterator<Item = Point>) -> Point {
    let mut sum = Point::ZERO;
    let mut count = 0usize;
    for point in points {
        sum = sum.add(&point);
        count += 1;
    }
    if count == 0 {
        Point::ZERO
    } else {
        sum.multiply(1.0 / count as f64)
    }
}

/// Mean distance of the points from their centroid
fn centroid_size(points: impl Iterator<Item = Point>, center: Point) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for point in points {
        total += point.distance_to(&center);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Distance-weighted mean angle change of the pointers around the centroid
fn rotation(pairs: &[(Point, Point)], previous_centroid: Point, current_centroid: Point) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }

    let mut rotation = 0.0;
    let mut total_weight = 0.0;
    for (before, after) in pairs {
        let previous_offset = before.subtract(&previous_centroid);
        let current_offset = after.subtract(&current_centroid);

        let mut angle = current_offset.angle_degrees() - previous_offset.angle_degrees();
        if angle > 180.0 {
            angle -= 360.0;
        } else if angle < -180.0 {
            angle += 360.0;
        }

        let weight = current_offset.add(&previous_offset).length() / 2.0;
        rotation += angle * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        0.0
    } else {
        rotation / total_weight
    }
}
