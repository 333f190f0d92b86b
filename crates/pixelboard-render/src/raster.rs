//! Nearest-neighbor raster renderer.
//!
//! Rebuilds the whole frame from a grid snapshot whenever state, scale, or
//! hover changes. Full-frame redraw is cheap at these grid sizes (a few
//! thousand cells); the generation-keyed cache only avoids *redundant*
//! rebuilds, it never patches a frame in place.

use pixelboard_core::grid::GridData;
use pixelboard_core::palette;

/// Brightness boost applied to the hovered cell.
const HOVER_BRIGHTEN: u8 = 48;

/// A rendered RGBA8 frame, tightly packed, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub width_px: u32,
    pub height_px: u32,
    /// `width_px * height_px * 4` bytes, RGBA order.
    pub data: Vec<u8>,
}

impl Frame {
    /// The RGBA bytes of the pixel at `(x, y)`, or `None` out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        let offset = (y as usize * self.width_px as usize + x as usize) * 4;
        let bytes = self.data.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Cache key: a frame is stale when any of these changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderKey {
    generation: u64,
    scale_bits: u32,
    hover: Option<usize>,
}

/// Frame builder with a last-drawn cache.
#[derive(Debug, Default)]
pub struct Renderer {
    frame: Frame,
    key: Option<RenderKey>,
    redraws: u64,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered frame (empty before the first render).
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of actual frame rebuilds performed.
    #[must_use]
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    /// Render the snapshot at the given scale, skipping the rebuild when
    /// generation, scale, and hover all match the cached frame.
    ///
    /// `generation` is the store's update counter; it stands in for deep
    /// equality on the snapshot contents.
    pub fn render(
        &mut self,
        grid: &GridData,
        generation: u64,
        scale: f32,
        hover: Option<usize>,
    ) -> &Frame {
        let key = RenderKey {
            generation,
            scale_bits: scale.to_bits(),
            hover,
        };
        if self.key != Some(key) {
            self.frame = render_frame(grid, scale, hover);
            self.key = Some(key);
            self.redraws += 1;
        }
        &self.frame
    }

    /// Drop the cache so the next [`Renderer::render`] rebuilds.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

/// Build a `width*scale x height*scale` RGBA frame from a snapshot.
///
/// Cell `(x, y)` fills the sub-rectangle `[x*s, (x+1)*s) x [y*s, (y+1)*s)`
/// uniformly with its decoded palette color; no smoothing or interpolation
/// across cell boundaries. Fractional scales resolve each output pixel to
/// `floor(out / scale)`, clamped, so every output pixel is an exact copy of
/// some cell's color.
#[must_use]
pub fn render_frame(grid: &GridData, scale: f32, hover: Option<usize>) -> Frame {
    let width = grid.width() as usize;
    let height = grid.height() as usize;
    if width == 0 || height == 0 {
        return Frame::default();
    }
    let width_px = (width as f32 * scale).round().max(1.0) as u32;
    let height_px = (height as f32 * scale).round().max(1.0) as u32;

    let mut data = Vec::with_capacity(width_px as usize * height_px as usize * 4);
    for oy in 0..height_px {
        let cy = ((oy as f32 / scale) as usize).min(height - 1);
        for ox in 0..width_px {
            let cx = ((ox as f32 / scale) as usize).min(width - 1);
            let index = cy * width + cx;
            let mut color = palette::decode(grid.pixels()[index]);
            if hover == Some(index) {
                color = color.brighten(HOVER_BRIGHTEN);
            }
            data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    Frame {
        width_px,
        height_px,
        data,
    }
}
