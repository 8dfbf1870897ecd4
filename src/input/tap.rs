use crate::{
    core::{config::GlobeConfig, geo::Point},
    input::events::{PointerBatch, PointerPhase},
    prelude::HashSet,
};

/// Maximum distance between two taps for them to count as a double tap
const DOUBLE_TAP_DISTANCE_THRESHOLD: f64 = 100.0;

/// Single-pointer press gestures
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapEvent {
    /// Released within the touch slop before the long-press timeout
    Tap { position: Point },
    /// Second tap close in time and space to the previous one. Follows its `Tap`.
    DoubleTap { position: Point },
    /// Held still past the long-press timeout; reported at the down position
    LongPress { position: Point },
}

#[derive(Debug, Clone, Copy)]
struct Press {
    id: u64,
    down_position: Point,
    down_time_ms: u64,
    /// Moved past the slop or joined by another pointer
    aborted: bool,
    long_press_fired: bool,
}

/// Recognizes taps, double taps and long presses from pointer batches.
///
/// Long presses are detected when a batch or a [`TapRecognizer::tick`] is
/// seen past the timeout, so hosts should keep ticking while a pointer is down.
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    pub enabled: bool,
    touch_slop: f64,
    long_press_timeout_ms: u64,
    double_tap_timeout_ms: u64,
    pressed: HashSet<u64>,
    press: Option<Press>,
    last_tap: Option<(Point, u64)>,
}

impl TapRecognizer {
    pub fn new(touch_slop: f64, long_press_timeout_ms: u64, double_tap_timeout_ms: u64) -> Self {
        Self {
            enabled: true,
            touch_slop,
            long_press_timeout_ms,
            double_tap_timeout_ms,
            pressed: HashSet::default(),
            press: None,
            last_tap: None,
        }
    }

    pub fn from_config(config: &GlobeConfig) -> Self {
        Self::new(
            config.touch_slop,
            config.long_press_timeout_ms,
            config.double_tap_timeout_ms,
        )
    }

    /// True while a press could still become a tap or long press
    pub fn is_pending(&self) -> bool {
        self.press
            .map_or(false, |press| !press.aborted && !press.long_press_fired)
    }

    pub fn process(&mut self, batch: &PointerBatch) -> Vec<TapEvent> {
        let mut output_events = Vec::new();
        if !self.enabled {
            return output_events;
        }

        // A press that outlived the timeout became a long press before this batch arrived
        if let Some(event) = self.tick(batch.time_ms) {
            output_events.push(event);
        }

        for event in &batch.events {
            match event.phase {
                PointerPhase::Down => {
                    self.pressed.insert(event.id);
                    if let Some(press) = self.press.as_mut() {
                        press.aborted = true;
                    } else if self.pressed.len() == 1 {
                        self.press = Some(Press {
                            id: event.id,
                            down_position: event.position,
                            down_time_ms: batch.time_ms,
                            aborted: false,
                            long_press_fired: false,
                        });
                    }
                }
                PointerPhase::Move => {
                    let slop = self.touch_slop;
                    if let Some(press) = self.press.as_mut() {
                        if press.id == event.id
                            && press.down_position.distance_to(&event.position) > slop
                        {
                            press.aborted = true;
                        }
                    }
                }
                PointerPhase::Up => {
                    self.pressed.remove(&event.id);
                    let Some(press) = self.press else {
                        continue;
                    };
                    if press.id != event.id {
                        continue;
                    }
                    self.press = None;

                    let held_ms = batch.time_ms.saturating_sub(press.down_time_ms);
                    let moved = press.down_position.distance_to(&event.position) > self.touch_slop;
                    if press.aborted
                        || press.long_press_fired
                        || moved
                        || held_ms >= self.long_press_timeout_ms
                    {
                        continue;
                    }
                    self.on_tap(event.position, batch.time_ms, &mut output_events);
                }
                PointerPhase::Cancel => {
                    self.pressed.clear();
                    self.press = None;
                }
            }
        }
        output_events
    }

    fn on_tap(&mut self, position: Point, time_ms: u64, output_events: &mut Vec<TapEvent>) {
        output_events.push(TapEvent::Tap { position });

        if let Some((last_position, last_time)) = self.last_tap {
            let interval = time_ms.saturating_sub(last_time);
            if interval <= self.double_tap_timeout_ms
                && position.distance_to(&last_position) <= DOUBLE_TAP_DISTANCE_THRESHOLD
            {
                output_events.push(TapEvent::DoubleTap { position });
                self.last_tap = None;
                return;
            }
        }
        self.last_tap = Some((position, time_ms));
    }

    /// Fires a pending long press once `now_ms` is past the timeout
    pub fn tick(&mut self, now_ms: u64) -> Option<TapEvent> {
        let timeout = self.long_press_timeout_ms;
        let press = self.press.as_mut()?;
        if press.aborted || press.long_press_fired {
            return None;
        }
        if now_ms.saturating_sub(press.down_time_ms) < timeout {
            return None;
        }
        press.long_press_fired = true;
        Some(TapEvent::LongPress {
            position: press.down_position,
        })
    }
}
