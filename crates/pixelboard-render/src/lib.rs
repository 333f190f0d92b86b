#![forbid(unsafe_code)]

//! Rendering layer for Pixelboard.
//!
//! Two small, deterministic pieces:
//! - [`viewport`]: pure coordinate mapping between pointer pixels, scaled
//!   canvas pixels, and logical grid cells, parameterized by the zoom scale.
//! - [`raster`]: nearest-neighbor redraw of a grid snapshot into a tightly
//!   packed RGBA frame, with a generation-keyed cache so unchanged state
//!   does not trigger a rebuild.
//!
//! The host owns the actual surface (canvas element, texture, window); this
//! crate only produces pixel bytes and cell coordinates.

pub mod raster;
pub mod viewport;

pub use raster::{Frame, Renderer};
pub use viewport::{MAX_SCALE, MIN_SCALE, Viewport};
