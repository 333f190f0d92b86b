//! Grid state store: the local mirror of the authoritative canvas.
//!
//! The store owns two parallel flat vectors indexed row-major
//! (`index = y * width + x`): palette indices and per-cell owner names.
//! Readers (renderer, input controller) never see a half-applied update:
//! every mutation builds a new [`GridData`] and replaces the shared `Arc`
//! in one step, so a snapshot taken before an update stays internally
//! consistent for as long as the reader holds it.

use std::sync::Arc;

use crate::update::{DeltaUpdate, FullUpdate};

/// A consistent point-in-time view of the canvas.
///
/// Invariant: `pixels.len() == owners.len() == width * height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridData {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    owners: Vec<String>,
}

impl GridData {
    /// Blank canvas: all pixels zero, no owners recorded.
    #[must_use]
    pub fn blank(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![0; len],
            owners: vec![String::new(); len],
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Total cell count (`width * height`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Palette index at a flat cell index, or `None` out of bounds.
    #[must_use]
    pub fn pixel(&self, index: usize) -> Option<u8> {
        self.pixels.get(index).copied()
    }

    /// Owner name at a flat cell index. Empty string means no owner.
    #[must_use]
    pub fn owner(&self, index: usize) -> Option<&str> {
        self.owners.get(index).map(String::as_str)
    }

    /// All palette indices, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// All owner names, row-major.
    #[must_use]
    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// Convert `(x, y)` cell coordinates to a flat index.
    #[inline]
    #[must_use]
    pub fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Per-entry accounting for an applied delta.
///
/// Skipped entries are the expected, non-fatal outcome for indices outside
/// the current grid (the rest of the delta still applies). The caller is
/// responsible for reporting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeltaOutcome {
    pub pixels_applied: usize,
    pub pixels_skipped: usize,
    pub owners_applied: usize,
    pub owners_skipped: usize,
}

impl DeltaOutcome {
    /// Total entries dropped for being out of range.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.pixels_skipped + self.owners_skipped
    }

    /// Total entries written.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.pixels_applied + self.owners_applied
    }
}

/// Errors from applying a full update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// A full update declared a zero-area grid.
    InvalidDimensions { width: u16, height: u16 },
}

impl core::fmt::Display for GridError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid grid dimensions: {width}x{height}")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Owner of the canvas mirror.
///
/// Mutated only by the sync session's inbound-message handler; everything
/// else reads through [`GridStore::snapshot`]. The generation counter bumps
/// on every applied update so the renderer can skip redundant redraws.
#[derive(Debug, Clone)]
pub struct GridStore {
    data: Arc<GridData>,
    generation: u64,
}

impl GridStore {
    /// Create a store holding a blank canvas.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            data: Arc::new(GridData::blank(width, height)),
            generation: 0,
        }
    }

    /// Consistent point-in-time view for rendering and hit testing.
    ///
    /// Cheap (`Arc` clone); the returned data never changes under the
    /// caller even if further updates are applied.
    #[must_use]
    pub fn snapshot(&self) -> Arc<GridData> {
        Arc::clone(&self.data)
    }

    /// Monotonic counter, bumped once per applied update.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the entire state from a full update.
    ///
    /// Empty `pixels` means blank canvas (zero-filled to the declared
    /// size). Payload vectors are truncated or padded to `width * height`
    /// so the length invariant holds no matter what the wire carried.
    pub fn apply_full(&mut self, update: FullUpdate) -> Result<(), GridError> {
        if update.width == 0 || update.height == 0 {
            return Err(GridError::InvalidDimensions {
                width: update.width,
                height: update.height,
            });
        }
        let len = update.width as usize * update.height as usize;

        let mut pixels = update.pixels;
        if pixels.is_empty() {
            pixels = vec![0; len];
        } else {
            pixels.resize(len, 0);
        }
        let mut owners = update.owners;
        owners.resize(len, String::new());

        self.data = Arc::new(GridData {
            width: update.width,
            height: update.height,
            pixels,
            owners,
        });
        self.generation += 1;
        Ok(())
    }

    /// Apply a delta against the current dimensions.
    ///
    /// In-range entries are written, out-of-range entries are skipped
    /// per-entry and counted in the returned outcome. The replacement is
    /// all-or-nothing with respect to existing snapshots: readers observe
    /// either the pre-delta or the post-delta state, never a mix.
    pub fn apply_delta(&mut self, update: DeltaUpdate) -> DeltaOutcome {
        let mut outcome = DeltaOutcome::default();
        if update.is_empty() {
            return outcome;
        }

        let mut next = (*self.data).clone();
        let len = next.pixels.len();

        for (index, color) in update.pixels {
            match next.pixels.get_mut(index as usize) {
                Some(slot) => {
                    *slot = color;
                    outcome.pixels_applied += 1;
                }
                None => outcome.pixels_skipped += 1,
            }
        }
        for (index, name) in update.owners {
            match next.owners.get_mut(index as usize) {
                Some(slot) => {
                    *slot = name;
                    outcome.owners_applied += 1;
                }
                None => outcome.owners_skipped += 1,
            }
        }

        debug_assert_eq!(next.pixels.len(), len);
        if outcome.applied() > 0 {
            self.data = Arc::new(next);
            self.generation += 1;
        }
        outcome
    }
}
