//! Sync session: connection lifecycle and inbound-update application.
//!
//! The session owns the grid store and is its only writer. It does not own
//! the transport: the host feeds received text frames into
//! [`Session::handle_message`] and sends whatever [`Session::submit`]
//! returns. Nothing here is fatal — bad messages are dropped with a
//! diagnostic and the client keeps rendering its last known state.

use std::sync::Arc;

use tracing::{debug, warn};

use pixelboard_core::grid::{DeltaOutcome, GridData, GridStore};

use crate::protocol::{self, InboundMessage, MutationIntent, ProtocolError};

/// Connection readiness, mirrored from the host's transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// What an inbound message did to the local mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A full update replaced the state (dimensions may have changed).
    AppliedFull,
    /// A delta applied; counts cover per-entry skips.
    AppliedDelta(DeltaOutcome),
    /// The message was discarded: protocol error, invalid dimensions, or a
    /// delta arriving before the post-connect full update.
    Dropped,
}

/// Client sync endpoint over a host-owned transport.
pub struct Session {
    store: GridStore,
    state: ConnectionState,
    /// Deltas are untrusted until a full update re-bases the mirror after
    /// each (re)connect; pre-disconnect dimensions may be stale.
    awaiting_full: bool,
    torn_down: bool,
}

impl Session {
    /// Create a session holding a blank mirror of the given size.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            store: GridStore::new(width, height),
            state: ConnectionState::Connecting,
            awaiting_full: true,
            torn_down: false,
        }
    }

    /// Current connection readiness.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consistent snapshot of the mirror for rendering and hit testing.
    #[must_use]
    pub fn snapshot(&self) -> Arc<GridData> {
        self.store.snapshot()
    }

    /// The store's update counter, for renderer dirty checks.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    // ── Connection lifecycle ────────────────────────────────────────

    /// The host started a connection attempt.
    pub fn connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// The transport opened. The mirror distrusts deltas until the server
    /// sends the next full update.
    pub fn on_open(&mut self) {
        debug!("connection open, awaiting full state");
        self.state = ConnectionState::Open;
        self.awaiting_full = true;
    }

    /// The transport dropped. The last known state stays renderable.
    pub fn on_close(&mut self) {
        self.state = ConnectionState::Closed;
    }

    /// Tear the session down; stops the standing reconnect policy.
    pub fn shutdown(&mut self) {
        self.state = ConnectionState::Closed;
        self.torn_down = true;
    }

    /// Standing reconnect policy: always reconnect after a disconnect,
    /// until the session is torn down.
    #[must_use]
    pub fn wants_reconnect(&self) -> bool {
        !self.torn_down && self.state == ConnectionState::Closed
    }

    // ── Inbound path ────────────────────────────────────────────────

    /// Decode and apply one inbound text frame.
    ///
    /// Protocol errors and invalid updates drop the message and leave the
    /// mirror untouched; per-entry range skips keep the rest of the delta.
    pub fn handle_message(&mut self, text: &str) -> SyncOutcome {
        let message = match protocol::decode_inbound(text) {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "dropping inbound message");
                return SyncOutcome::Dropped;
            }
        };

        match message {
            InboundMessage::Full(full) => {
                let snapshot = self.store.snapshot();
                let prior = (snapshot.width(), snapshot.height());
                let (update, report) = full.into_update(prior);
                if report.dropped() > 0 {
                    warn!(dropped = report.dropped(), "full update had unusable owner entries");
                }
                match self.store.apply_full(update) {
                    Ok(()) => {
                        self.awaiting_full = false;
                        SyncOutcome::AppliedFull
                    }
                    Err(err) => {
                        warn!(%err, "dropping full update");
                        SyncOutcome::Dropped
                    }
                }
            }
            InboundMessage::Delta(delta) => {
                if self.awaiting_full {
                    warn!("dropping delta received before full state");
                    return SyncOutcome::Dropped;
                }
                let (update, report) = delta.into_update();
                if report.dropped() > 0 {
                    warn!(dropped = report.dropped(), "delta had unparseable index keys");
                }
                let outcome = self.store.apply_delta(update);
                if outcome.skipped() > 0 {
                    warn!(skipped = outcome.skipped(), "delta entries out of range");
                }
                SyncOutcome::AppliedDelta(outcome)
            }
        }
    }

    // ── Outbound path ───────────────────────────────────────────────

    /// Encode a mutation intent for the host transport.
    ///
    /// Returns `None` unless the connection is open: while disconnected no
    /// intents are sent and the click is simply lost (expected, not an
    /// error). Fire-and-forget — there is no in-flight request to track.
    #[must_use]
    pub fn submit(&self, intent: &MutationIntent) -> Option<String> {
        if self.state != ConnectionState::Open {
            return None;
        }
        match protocol::encode_intent(intent) {
            Ok(frame) => Some(frame),
            Err(err) => {
                warn!(%err, "failed to encode mutation intent");
                None
            }
        }
    }
}
