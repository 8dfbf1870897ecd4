pub mod animatable;
pub mod decay;
pub mod easing;
pub mod inertia;
pub mod velocity;

// Re-export commonly used types for convenience
pub use animatable::{
    Animatable, AnimationEndReason, AnimationHandle, AnimationResult, AnimationVector, TweenSpec,
};
pub use decay::{DecayAnimation, ExponentialDecay};
pub use easing::Easing;
pub use inertia::{InertiaAnimator, InertiaPhase};
pub use velocity::{DiffVelocityTracker, VelocityTracker1D};
