pub mod events;
pub mod gestures;
pub mod tap;

// Re-export the essential types
pub use events::{PointerBatch, PointerEvent, PointerPhase};
pub use gestures::{DecoderState, GestureDecoder, GestureDelta, GestureEvent};
pub use tap::{TapEvent, TapRecognizer};
