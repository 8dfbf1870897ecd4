pub mod camera;
pub mod frame;

// Re-export main types
pub use camera::{ndc_to_screen, screen_to_ndc, CameraModel, Sphere, ViewProjection};
pub use frame::{
    FrameReceiver, FrameScheduler, GlobeUniforms, MarkerInstance, RenderSnapshot, RenderedMarker,
};
