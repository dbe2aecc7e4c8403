//! Mask painting: overlay surface, stroke tracking, export and projection
//!
//! Strokes are painted as translucent cyan for feedback, but the exported
//! mask is strictly black/white: alpha is thresholded at `> 0`.

pub mod projection;
pub mod renderer;
pub mod script;
pub mod surface;

pub use projection::LetterboxProjection;
pub use renderer::{MaskRenderer, StrokeTarget};
pub use script::{ScriptedStroke, StrokeScript};
pub use surface::{OverlaySurface, BRUSH_COLOR};
