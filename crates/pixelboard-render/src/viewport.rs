//! Coordinate mapping between pointer, canvas, and grid cell space.
//!
//! All functions are pure and total. Pointer positions routinely land
//! fractionally outside the rendered area due to sub-pixel and zoom
//! rounding, so [`Viewport::screen_to_cell`] clamps to the nearest valid
//! edge cell instead of rejecting the event.

/// Minimum zoom scale (one screen pixel per cell).
pub const MIN_SCALE: f32 = 1.0;

/// Maximum zoom scale.
pub const MAX_SCALE: f32 = 40.0;

/// Zoom arithmetic for a wheel event.
///
/// Scrolling up (negative `dy`) zooms in. The sign mapping is a UX-facing
/// contract inherited from natural-scroll conventions; do not re-derive it.
/// The result is clamped to `[MIN_SCALE, MAX_SCALE]`; `dy == 0` leaves the
/// scale unchanged.
#[must_use]
pub fn wheel_delta_to_scale(current: f32, dy: i16, step: f32) -> f32 {
    let sign = match dy {
        0 => return current.clamp(MIN_SCALE, MAX_SCALE),
        d if d < 0 => -1.0,
        _ => 1.0,
    };
    (current - sign * step).clamp(MIN_SCALE, MAX_SCALE)
}

/// Mapping between screen pixels and logical grid cells at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u16,
    height: u16,
    scale: f32,
}

impl Viewport {
    /// Create a viewport for a `width x height` grid at an initial scale
    /// (clamped into the valid range).
    #[must_use]
    pub fn new(width: u16, height: u16, scale: f32) -> Self {
        Self {
            width,
            height,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Current zoom scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Replace the zoom scale, clamped into the valid range.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Adopt new grid dimensions (a full update may redefine them).
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Apply a wheel event and return the new scale.
    pub fn zoom(&mut self, dy: i16, step: f32) -> f32 {
        self.scale = wheel_delta_to_scale(self.scale, dy, step);
        self.scale
    }

    /// Map a pointer position to a grid cell.
    ///
    /// Divides by the scale, floors, and clamps into
    /// `[0, width-1] x [0, height-1]`: positions at or beyond the rendered
    /// edge map to the nearest edge cell. Total for any finite input.
    #[must_use]
    pub fn screen_to_cell(&self, px: f32, py: f32) -> (u16, u16) {
        (
            clamp_axis(px / self.scale, self.width),
            clamp_axis(py / self.scale, self.height),
        )
    }

    /// Flatten `(x, y)` cell coordinates to a row-major index.
    #[inline]
    #[must_use]
    pub fn cell_to_index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

fn clamp_axis(value: f32, cells: u16) -> u16 {
    if cells == 0 {
        return 0;
    }
    let max = (cells - 1) as f32;
    // NaN compares false everywhere, so it falls through to the zero arm.
    if value >= max {
        cells - 1
    } else if value > 0.0 {
        value as u16
    } else {
        0
    }
}
