#![forbid(unsafe_code)]

//! Shared-canvas data model: palette, grid state, and update types.
//!
//! # Role in Pixelboard
//! `pixelboard-core` is the authoritative-as-known mirror of the remote
//! canvas. It owns the pixel and ownership arrays, applies full and delta
//! updates under a copy-on-write snapshot contract, and decodes palette
//! indices into concrete colors.
//!
//! # This crate provides
//! - [`palette`]: total color-index decoding over a fixed web-safe table.
//! - [`grid`]: [`GridStore`] with consistent point-in-time snapshots.
//! - [`update`]: [`FullUpdate`] / [`DeltaUpdate`] value types.
//!
//! # How it fits in the system
//! `pixelboard-client` normalizes wire messages into update values and
//! applies them here; `pixelboard-render` reads snapshots to build frames.
//! This crate performs no I/O and knows nothing about the wire format.

pub mod grid;
pub mod palette;
pub mod update;

pub use grid::{DeltaOutcome, GridData, GridError, GridStore};
pub use palette::{PALETTE_LEN, Rgba, decode};
pub use update::{DeltaUpdate, FullUpdate, Update};
