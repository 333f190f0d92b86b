//! Update value types.
//!
//! Updates arrive from the sync layer already normalized: sparse wire-side
//! owner maps have been expanded to dense vectors, and delta entries carry
//! parsed numeric indices. Range checks against the *current* grid
//! dimensions happen at application time in [`GridStore`](crate::GridStore),
//! since a delta is only meaningful relative to the state it lands on.

/// Wholesale replacement of the grid state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullUpdate {
    pub width: u16,
    pub height: u16,
    /// Palette indices, row-major. Empty means "blank canvas": the store
    /// zero-fills to `width * height`.
    pub pixels: Vec<u8>,
    /// Dense owner names, one per cell. Shorter vectors are padded with the
    /// empty string ("no owner recorded").
    pub owners: Vec<String>,
}

impl FullUpdate {
    /// A blank-canvas update for the given dimensions.
    #[must_use]
    pub fn blank(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: Vec::new(),
            owners: Vec::new(),
        }
    }
}

/// Incremental changes against the current grid dimensions.
///
/// Indices outside the current grid are skipped per-entry at application
/// time; a delta never changes `width * height`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeltaUpdate {
    pub pixels: Vec<(u32, u8)>,
    pub owners: Vec<(u32, String)>,
}

impl DeltaUpdate {
    /// Whether the delta carries no changes of either kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty() && self.owners.is_empty()
    }
}

/// A decoded, normalized inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Full(FullUpdate),
    Delta(DeltaUpdate),
}
