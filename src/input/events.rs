use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// What happened to a pointer in one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The platform took the pointer away; the whole gesture is abandoned
    Cancel,
}

/// Individual pointer (finger or mouse) change, in view pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub id: u64,
    pub position: Point,
    pub phase: PointerPhase,
}

impl PointerEvent {
    pub fn new(id: u64, position: Point, phase: PointerPhase) -> Self {
        Self {
            id,
            position,
            phase,
        }
    }

    pub fn down(id: u64, x: f64, y: f64) -> Self {
        Self::new(id, Point::new(x, y), PointerPhase::Down)
    }

    pub fn moved(id: u64, x: f64, y: f64) -> Self {
        Self::new(id, Point::new(x, y), PointerPhase::Move)
    }

    pub fn up(id: u64, x: f64, y: f64) -> Self {
        Self::new(id, Point::new(x, y), PointerPhase::Up)
    }

    pub fn cancel(id: u64, x: f64, y: f64) -> Self {
        Self::new(id, Point::new(x, y), PointerPhase::Cancel)
    }

    /// True while the pointer touches the surface after this event
    pub fn is_pressed(&self) -> bool {
        matches!(self.phase, PointerPhase::Down | PointerPhase::Move)
    }
}

/// Pointer changes that arrived together, in arrival order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerBatch {
    pub time_ms: u64,
    pub events: Vec<PointerEvent>,
}

impl PointerBatch {
    pub fn new(time_ms: u64, events: Vec<PointerEvent>) -> Self {
        Self { time_ms, events }
    }

    pub fn single(time_ms: u64, event: PointerEvent) -> Self {
        Self::new(time_ms, vec![event])
    }

    pub fn is_cancel(&self) -> bool {
        self.events
            .iter()
            .any(|event| event.phase == PointerPhase::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_phases() {
        assert!(PointerEvent::down(1, 0.0, 0.0).is_pressed());
        assert!(PointerEvent::moved(1, 0.0, 0.0).is_pressed());
        assert!(!PointerEvent::up(1, 0.0, 0.0).is_pressed());
        assert!(!PointerEvent::cancel(1, 0.0, 0.0).is_pressed());
    }

    #[test]
    fn test_batch_json_shape() {
        let batch = PointerBatch::single(16, PointerEvent::down(7, 10.0, 20.0));
        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains("\"phase\":\"Down\""));
        let parsed: PointerBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, batch);
        assert!(!parsed.is_cancel());
    }
}
