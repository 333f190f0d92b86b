//! The consolidated canvas engine.
//!
//! One canonical composition of store, viewport, renderer, input, and sync
//! session, with the per-deployment variation (grid size, debounce, tooltip
//! and zoom features) expressed as [`EngineConfig`] instead of parallel
//! component variants. The host owns the socket and the drawing surface;
//! the engine turns inbound text frames into state, state into frames, and
//! pointer events into outbound text frames.

use tracing::debug;

use pixelboard_render::raster::{Frame, Renderer};
use pixelboard_render::viewport::Viewport;

use crate::input::{Identity, InputConfig, InputController, Modifiers, PointerEventJson, Tooltip};
use crate::session::{ConnectionState, Session, SyncOutcome};

/// Engine construction parameters and feature flags.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Grid dimensions assumed until the first full update declares them.
    pub width: u16,
    pub height: u16,
    /// Initial zoom scale, clamped to the valid range.
    pub initial_scale: f32,
    pub input: InputConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            initial_scale: 1.0,
            input: InputConfig::default(),
        }
    }
}

/// The engine's reaction to a replayed pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerReaction {
    /// A qualifying click produced this outbound wire frame.
    Send(String),
    /// A hover produced (or cleared) the tooltip.
    Hover(Option<Tooltip>),
    /// A wheel event changed the scale.
    Zoomed(f32),
    /// The event was consumed without any visible effect.
    None,
}

/// Client-side state-synchronization and rendering engine.
pub struct CanvasEngine {
    session: Session,
    viewport: Viewport,
    renderer: Renderer,
    input: InputController,
}

impl CanvasEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            session: Session::new(config.width, config.height),
            viewport: Viewport::new(config.width, config.height, config.initial_scale),
            renderer: Renderer::new(),
            input: InputController::new(config.input),
        }
    }

    // ── Sync path ───────────────────────────────────────────────────

    /// Feed one inbound text frame from the transport.
    ///
    /// A full update may redefine the grid dimensions; the viewport adopts
    /// them so subsequent pointer mapping stays in bounds.
    pub fn handle_inbound(&mut self, text: &str) -> SyncOutcome {
        let outcome = self.session.handle_message(text);
        if outcome == SyncOutcome::AppliedFull {
            let snap = self.session.snapshot();
            if (snap.width(), snap.height()) != (self.viewport.width(), self.viewport.height()) {
                debug!(width = snap.width(), height = snap.height(), "grid dimensions changed");
                self.viewport.resize(snap.width(), snap.height());
            }
        }
        outcome
    }

    // ── Connection lifecycle (forwarded to the session) ─────────────

    pub fn connect(&mut self) {
        self.session.connect();
    }

    pub fn on_open(&mut self) {
        self.session.on_open();
    }

    pub fn on_close(&mut self) {
        self.session.on_close();
    }

    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }

    #[must_use]
    pub fn wants_reconnect(&self) -> bool {
        self.session.wants_reconnect()
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.session.state()
    }

    // ── Input paths ─────────────────────────────────────────────────

    /// Click path: returns the encoded outbound frame for a qualifying
    /// click, ready for the host transport. `None` for every suppressed
    /// click (rate-limited, unauthenticated, or not connected).
    pub fn pointer_click(
        &mut self,
        px: f32,
        py: f32,
        now_ms: u64,
        mods: Modifiers,
        identity: &dyn Identity,
    ) -> Option<String> {
        let state = self.session.state();
        let intent = self
            .input
            .on_click(px, py, now_ms, mods, &self.viewport, identity, state)?;
        self.session.submit(&intent)
    }

    /// Hover path: tooltip for the cell under the pointer, if owned.
    pub fn pointer_move(&mut self, px: f32, py: f32, mods: Modifiers) -> Option<Tooltip> {
        let snapshot = self.session.snapshot();
        self.input
            .on_pointer_move(px, py, mods, &self.viewport, &snapshot)
    }

    /// Current tooltip text, recomputed from the live snapshot (updates
    /// while hovering the same cell if the owner changes underneath).
    #[must_use]
    pub fn tooltip(&self) -> Option<String> {
        let snapshot = self.session.snapshot();
        self.input.tooltip(&snapshot).map(str::to_string)
    }

    /// Zoom path: `Some(new_scale)` when the event was consumed (the host
    /// must suppress the default scroll), `None` when zoom is disabled.
    pub fn wheel(&mut self, dy: i16) -> Option<f32> {
        self.input.on_wheel(dy, &mut self.viewport)
    }

    /// Focus change from the host.
    pub fn focus(&mut self, focused: bool) {
        self.input.on_focus(focused);
    }

    /// Replay one recorded pointer event.
    pub fn apply_pointer(
        &mut self,
        event: PointerEventJson,
        identity: &dyn Identity,
    ) -> PointerReaction {
        match event {
            PointerEventJson::Click { x, y, mods, at_ms } => self
                .pointer_click(x, y, at_ms, Modifiers::from_bits_truncate(mods), identity)
                .map_or(PointerReaction::None, PointerReaction::Send),
            PointerEventJson::Move { x, y, mods } => {
                PointerReaction::Hover(self.pointer_move(x, y, Modifiers::from_bits_truncate(mods)))
            }
            PointerEventJson::Wheel { dy, .. } => self
                .wheel(dy)
                .map_or(PointerReaction::None, PointerReaction::Zoomed),
            PointerEventJson::Focus { focused } => {
                self.focus(focused);
                PointerReaction::None
            }
        }
    }

    // ── Render path ─────────────────────────────────────────────────

    /// Current zoom scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.viewport.scale()
    }

    /// Render (or reuse) the frame for the current state, scale, and hover.
    ///
    /// The hover highlight follows the ownership-tooltip feature flag; with
    /// the feature off the frame is hover-independent.
    pub fn frame(&mut self) -> &Frame {
        let snapshot = self.session.snapshot();
        let hover = if self.input.config().enable_ownership_tooltip {
            self.input.hover_index()
        } else {
            None
        };
        self.renderer
            .render(&snapshot, self.session.generation(), self.viewport.scale(), hover)
    }
}
