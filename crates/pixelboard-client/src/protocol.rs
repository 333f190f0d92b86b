//! JSON wire codec for the canvas sync protocol.
//!
//! Inbound messages are JSON objects discriminated by a `type` field:
//!
//! ```text
//! {"type":"full","meta":{"width":W,"height":H},"pixels":[...],"owners":{...}|[...]}
//! {"type":"delta","pixels":{"<index>":color,...},"owners":{"<index>":"name",...}}
//! ```
//!
//! The two owners representations (sparse object keyed by stringified index,
//! or dense array) are normalized to a dense vector here, in one place, so
//! the rest of the engine only ever sees dense owner data. Outbound traffic
//! is a single shape: the mutation intent `{"x":int,"y":int,"user":string}`.
//!
//! Decode failures are values, not panics: the session drops the offending
//! message, logs, and keeps its current state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pixelboard_core::update::{DeltaUpdate, FullUpdate};

/// Sentinel user label for accounts with no uid.
pub const UNKNOWN_USER: &str = "NA";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while decoding inbound or encoding outbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload was not valid JSON, or a field had the wrong shape.
    Json(String),
    /// A required field is absent.
    MissingField(&'static str),
    /// The `type` discriminator named no known message.
    UnknownType(String),
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownType(t) => write!(f, "unknown message type: {t:?}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ---------------------------------------------------------------------------
// Outbound: mutation intent
// ---------------------------------------------------------------------------

/// A client-originated request to change one cell.
///
/// Fire-and-forget: the intent is sent once per qualifying click and never
/// applied locally; the server's next full/delta update is the only
/// confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationIntent {
    pub x: u16,
    pub y: u16,
    pub user: String,
}

/// Encode a mutation intent as the outbound wire message.
pub fn encode_intent(intent: &MutationIntent) -> Result<String, ProtocolError> {
    serde_json::to_string(intent).map_err(|e| ProtocolError::Json(e.to_string()))
}

// ---------------------------------------------------------------------------
// Inbound messages
// ---------------------------------------------------------------------------

/// Per-message accounting for entries dropped during normalization
/// (non-numeric index keys, sparse owner indices past the grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeReport {
    pub dropped_pixel_keys: usize,
    pub dropped_owner_keys: usize,
}

impl NormalizeReport {
    /// Total entries dropped; the rest of the message still applies.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped_pixel_keys + self.dropped_owner_keys
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct MetaWire {
    width: u16,
    height: u16,
}

/// `owners` arrives either dense or sparse on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum OwnersWire {
    Dense(Vec<String>),
    Sparse(BTreeMap<String, String>),
}

/// A decoded `type:"full"` message, prior to dimension resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FullMessage {
    #[serde(default)]
    meta: Option<MetaWire>,
    #[serde(default)]
    pixels: Vec<u8>,
    #[serde(default)]
    owners: Option<OwnersWire>,
}

impl FullMessage {
    /// Declared dimensions, if the message carried a `meta` block.
    #[must_use]
    pub fn meta(&self) -> Option<(u16, u16)> {
        self.meta.as_ref().map(|m| (m.width, m.height))
    }

    /// Normalize into a core update against the prior dimensions.
    ///
    /// `meta` takes precedence; without it the prior dimensions are
    /// retained. Sparse owner maps are expanded to a dense vector of
    /// `width * height` entries, dropping (and counting) unparseable or
    /// out-of-range keys.
    #[must_use]
    pub fn into_update(self, prior: (u16, u16)) -> (FullUpdate, NormalizeReport) {
        let (width, height) = self.meta().unwrap_or(prior);
        let len = width as usize * height as usize;
        let mut report = NormalizeReport::default();

        let owners = match self.owners {
            None => Vec::new(),
            Some(OwnersWire::Dense(dense)) => dense,
            Some(OwnersWire::Sparse(sparse)) => {
                let mut dense = vec![String::new(); len];
                for (key, name) in sparse {
                    match key.parse::<usize>() {
                        Ok(index) if index < len => dense[index] = name,
                        _ => report.dropped_owner_keys += 1,
                    }
                }
                dense
            }
        };

        (
            FullUpdate {
                width,
                height,
                pixels: self.pixels,
                owners,
            },
            report,
        )
    }
}

/// A decoded `type:"delta"` message.
///
/// Both fields are optional on the wire; absence means "no changes of that
/// kind".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeltaMessage {
    #[serde(default)]
    pixels: Option<BTreeMap<String, u8>>,
    #[serde(default)]
    owners: Option<BTreeMap<String, String>>,
}

impl DeltaMessage {
    /// Parse stringified index keys into a core delta.
    ///
    /// Non-numeric keys are dropped per-entry and counted; range checking
    /// against the live dimensions happens in the store.
    #[must_use]
    pub fn into_update(self) -> (DeltaUpdate, NormalizeReport) {
        let mut report = NormalizeReport::default();
        let mut update = DeltaUpdate::default();

        for (key, color) in self.pixels.unwrap_or_default() {
            match key.parse::<u32>() {
                Ok(index) => update.pixels.push((index, color)),
                Err(_) => report.dropped_pixel_keys += 1,
            }
        }
        for (key, name) in self.owners.unwrap_or_default() {
            match key.parse::<u32>() {
                Ok(index) => update.owners.push((index, name)),
                Err(_) => report.dropped_owner_keys += 1,
            }
        }
        (update, report)
    }
}

/// A decoded inbound protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Full(FullMessage),
    Delta(DeltaMessage),
}

/// Decode one inbound JSON text frame.
///
/// Rejects malformed JSON, a missing `type` field, an unknown `type`, and
/// wrong-shaped payload fields. Rejection never carries partial state: the
/// caller simply drops the message.
pub fn decode_inbound(text: &str) -> Result<InboundMessage, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))?;
    let msg_type = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or(ProtocolError::MissingField("type"))?;

    match msg_type.as_str() {
        "full" => serde_json::from_value(value)
            .map(InboundMessage::Full)
            .map_err(|e| ProtocolError::Json(e.to_string())),
        "delta" => serde_json::from_value(value)
            .map(InboundMessage::Delta)
            .map_err(|e| ProtocolError::Json(e.to_string())),
        other => Err(ProtocolError::UnknownType(other.to_owned())),
    }
}
