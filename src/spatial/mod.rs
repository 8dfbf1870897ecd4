pub mod index;

pub use index::{MarkerHit, MarkerIndex};
