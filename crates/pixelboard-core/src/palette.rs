//! Palette codec: color index to RGBA.
//!
//! The palette is the 216-entry web-safe table (every channel drawn from
//! `{0, 51, 102, 153, 204, 255}`), built once at compile time and immutable
//! for the program lifetime. Decoding is a total function: indices past the
//! end of the table decode to opaque black instead of failing, so a bad
//! entry in an inbound update can never blank a frame.

/// A 4-channel color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque black, the fallback for out-of-table indices.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Fully opaque color from RGB channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Brightened copy, used for the hover highlight. Channels saturate.
    #[must_use]
    pub const fn brighten(self, amount: u8) -> Self {
        Self {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
            a: self.a,
        }
    }
}

/// Number of entries in the palette table.
pub const PALETTE_LEN: usize = 216;

/// Channel steps of the web-safe cube.
const STEP: u8 = 51;

const PALETTE: [Rgba; PALETTE_LEN] = build_palette();

const fn build_palette() -> [Rgba; PALETTE_LEN] {
    let mut table = [Rgba::BLACK; PALETTE_LEN];
    let mut i = 0;
    while i < PALETTE_LEN {
        let r = (i / 36) as u8 * STEP;
        let g = ((i / 6) % 6) as u8 * STEP;
        let b = (i % 6) as u8 * STEP;
        table[i] = Rgba::rgb(r, g, b);
        i += 1;
    }
    table
}

/// Decode a palette index into a concrete color.
///
/// Total over the full `u8` range the wire can carry: indices at or past
/// [`PALETTE_LEN`] decode to [`Rgba::BLACK`].
#[must_use]
pub const fn decode(index: u8) -> Rgba {
    if (index as usize) < PALETTE_LEN {
        PALETTE[index as usize]
    } else {
        Rgba::BLACK
    }
}
