#![forbid(unsafe_code)]

//! Client engine for the Pixelboard shared canvas.
//!
//! # Role in Pixelboard
//! This crate is the host-facing surface: it consumes inbound protocol
//! frames, keeps the local mirror in sync, renders frames on demand, and
//! turns pointer input into rate-limited mutation intents. The host owns
//! the actual WebSocket and drawing surface and drives everything through
//! discrete events on one logical loop; nothing here blocks or spawns.
//!
//! # This crate provides
//! - [`protocol`]: the JSON wire codec and owners normalization.
//! - [`session`]: connection lifecycle and inbound-update application.
//! - [`input`]: debounced click, live tooltip, and zoom handling.
//! - [`engine`]: the consolidated [`CanvasEngine`] with feature-flag
//!   configuration replacing per-deployment component variants.
//!
//! # Error posture
//! Degrade to a stale view rather than crash: protocol errors drop the
//! message, range errors drop the entry, disconnects keep the last known
//! state renderable while the standing reconnect policy runs.

pub mod engine;
pub mod input;
pub mod protocol;
pub mod session;

pub use engine::{CanvasEngine, EngineConfig, PointerReaction};
pub use input::{
    Identity, InputConfig, InputController, Modifiers, PointerEventJson, Tooltip, UserInfo,
};
pub use protocol::{MutationIntent, ProtocolError, UNKNOWN_USER, encode_intent};
pub use session::{ConnectionState, Session, SyncOutcome};
