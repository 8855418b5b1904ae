//! Generic field-of-view computation.

mod falloff;
pub use falloff::Falloff;

mod raycast;
pub use raycast::{Ray, RaycastFov};

mod square;
pub use square::perimeter;
