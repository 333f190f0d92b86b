//! Deterministic pointer input handling.
//!
//! The host supplies pointer pixel coordinates, quantized (`i16`) wheel
//! deltas, and event timestamps (`now_ms`), so every path here is a pure
//! state-machine step suitable for record/replay. Three paths:
//!
//! - **click**: map to a cell and emit a [`MutationIntent`], gated by the
//!   rate limit, the injected identity capability, and connection readiness
//!   (all three rejections are silent — expected, frequent, non-exceptional).
//! - **hover**: map to a cell and look up the owner for the tooltip; the
//!   tooltip is recomputed from the current snapshot, never a stale copy.
//! - **wheel**: clamped zoom step; the host must suppress the default
//!   scroll when the event is consumed.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use pixelboard_core::grid::GridData;
use pixelboard_render::viewport::Viewport;

use crate::protocol::{MutationIntent, UNKNOWN_USER};
use crate::session::ConnectionState;

bitflags! {
    /// Modifier keys held during a pointer event, as a compact `u8` bitset.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Minimal modifier tracker guaranteeing no stuck modifiers after focus loss.
#[derive(Debug, Default, Clone)]
pub struct ModifierTracker {
    current: Modifiers,
}

impl ModifierTracker {
    #[must_use]
    pub const fn current(&self) -> Modifiers {
        self.current
    }

    pub fn handle_focus(&mut self, focused: bool) {
        if !focused {
            self.current = Modifiers::empty();
        }
    }

    pub fn reconcile(&mut self, seen: Modifiers) {
        self.current = seen;
    }
}

/// The identity capability, owned by the external identity collaborator.
pub trait Identity {
    fn is_authenticated(&self) -> bool;
    fn current_user(&self) -> Option<UserInfo>;
}

/// Display identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub display_name: String,
    pub uid: Option<String>,
}

impl UserInfo {
    /// The label attached to outbound intents: the display name, or the
    /// unknown-user sentinel when there is no uid.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.uid.is_some() {
            &self.display_name
        } else {
            UNKNOWN_USER
        }
    }
}

/// Input feature flags and tunables.
///
/// The click debounce bounds request rate from a single user regardless of
/// how fast they click; it is deployment configuration, not a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct InputConfig {
    pub click_debounce_ms: u64,
    pub enable_ownership_tooltip: bool,
    pub enable_zoom: bool,
    pub zoom_step: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            click_debounce_ms: 1000,
            enable_ownership_tooltip: true,
            enable_zoom: true,
            zoom_step: 1.0,
        }
    }
}

/// Tooltip content positioned at the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub owner: String,
    pub x: f32,
    pub y: f32,
}

/// Pointer state machine composing the coordinate mapper and grid snapshot.
#[derive(Debug, Default)]
pub struct InputController {
    config: InputConfig,
    last_click_ms: Option<u64>,
    hover_index: Option<usize>,
    modifiers: ModifierTracker,
}

impl InputController {
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            last_click_ms: None,
            hover_index: None,
            modifiers: ModifierTracker::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// The most recently hovered cell index, if any.
    #[must_use]
    pub fn hover_index(&self) -> Option<usize> {
        self.hover_index
    }

    /// Modifiers currently held, as last reconciled from the host.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers.current()
    }

    /// Focus change; losing focus clears held modifiers.
    pub fn on_focus(&mut self, focused: bool) {
        self.modifiers.handle_focus(focused);
        if !focused {
            self.hover_index = None;
        }
    }

    /// Click path: emit a mutation intent for a qualifying click.
    ///
    /// Suppressed silently when the click lands inside the debounce window,
    /// the caller is unauthenticated, or the connection is not open. The
    /// debounce clock only advances on qualifying clicks.
    pub fn on_click(
        &mut self,
        px: f32,
        py: f32,
        now_ms: u64,
        mods: Modifiers,
        viewport: &Viewport,
        identity: &dyn Identity,
        connection: ConnectionState,
    ) -> Option<MutationIntent> {
        self.modifiers.reconcile(mods);

        if let Some(last) = self.last_click_ms
            && now_ms.saturating_sub(last) < self.config.click_debounce_ms
        {
            return None;
        }
        if !identity.is_authenticated() || connection != ConnectionState::Open {
            return None;
        }

        let user = identity
            .current_user()
            .map_or_else(|| UNKNOWN_USER.to_string(), |u| u.label().to_string());
        let (x, y) = viewport.screen_to_cell(px, py);
        self.last_click_ms = Some(now_ms);
        Some(MutationIntent { x, y, user })
    }

    /// Hover path: track the hovered cell and produce tooltip content.
    ///
    /// Tooltip visibility is purely a function of the hover index and the
    /// supplied snapshot; cells with no recorded owner show nothing.
    pub fn on_pointer_move(
        &mut self,
        px: f32,
        py: f32,
        mods: Modifiers,
        viewport: &Viewport,
        snapshot: &GridData,
    ) -> Option<Tooltip> {
        self.modifiers.reconcile(mods);
        let (x, y) = viewport.screen_to_cell(px, py);
        self.hover_index = Some(viewport.cell_to_index(x, y));
        self.tooltip(snapshot).map(|owner| Tooltip {
            owner: owner.to_string(),
            x: px,
            y: py,
        })
    }

    /// Owner text for the current hover index against a *current* snapshot.
    ///
    /// Re-resolves on every call, so an owner change while hovering the
    /// same cell updates the tooltip without a new pointer event.
    #[must_use]
    pub fn tooltip<'a>(&self, snapshot: &'a GridData) -> Option<&'a str> {
        if !self.config.enable_ownership_tooltip {
            return None;
        }
        let owner = snapshot.owner(self.hover_index?)?;
        if owner.is_empty() { None } else { Some(owner) }
    }

    /// Zoom path: apply a wheel event to the viewport scale.
    ///
    /// Returns the new scale when zoom is enabled (the host must then
    /// suppress the event's default scroll), or `None` when disabled.
    pub fn on_wheel(&mut self, dy: i16, viewport: &mut Viewport) -> Option<f32> {
        if !self.config.enable_zoom {
            return None;
        }
        Some(viewport.zoom(dy, self.config.zoom_step))
    }
}

// ---------------------------------------------------------------------------
// JSON schema for record/replay
// ---------------------------------------------------------------------------

/// Stable JSON encoding of pointer events: a `kind` tag plus the minimum
/// semantic fields needed to replay a session against the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEventJson {
    Click { x: f32, y: f32, mods: u8, at_ms: u64 },
    Move { x: f32, y: f32, mods: u8 },
    Wheel { dy: i16, mods: u8 },
    Focus { focused: bool },
}

impl PointerEventJson {
    /// Encode this event as a stable JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a previously encoded event.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct FakeIdentity {
        user: Option<UserInfo>,
    }

    impl FakeIdentity {
        fn signed_in(name: &str) -> Self {
            Self {
                user: Some(UserInfo {
                    display_name: name.to_string(),
                    uid: Some("uid-1".to_string()),
                }),
            }
        }

        fn anonymous() -> Self {
            Self { user: None }
        }
    }

    impl Identity for FakeIdentity {
        fn is_authenticated(&self) -> bool {
            self.user.is_some()
        }

        fn current_user(&self) -> Option<UserInfo> {
            self.user.clone()
        }
    }

    fn controller(debounce_ms: u64) -> InputController {
        InputController::new(InputConfig {
            click_debounce_ms: debounce_ms,
            ..InputConfig::default()
        })
    }

    fn grid_with_owner(index: u32, name: &str) -> GridData {
        use pixelboard_core::update::DeltaUpdate;
        use pixelboard_core::GridStore;

        let mut store = GridStore::new(4, 4);
        store.apply_delta(DeltaUpdate {
            pixels: Vec::new(),
            owners: vec![(index, name.to_string())],
        });
        (*store.snapshot()).clone()
    }

    #[test]
    fn qualifying_click_emits_intent() {
        let mut input = controller(200);
        let vp = Viewport::new(4, 4, 1.0);
        let intent = input
            .on_click(
                1.5,
                1.5,
                1_000,
                Modifiers::empty(),
                &vp,
                &FakeIdentity::signed_in("alice"),
                ConnectionState::Open,
            )
            .expect("qualifying click");
        assert_eq!(intent, MutationIntent { x: 1, y: 1, user: "alice".to_string() });
    }

    #[test]
    fn rapid_second_click_is_suppressed() {
        let mut input = controller(200);
        let vp = Viewport::new(4, 4, 1.0);
        let identity = FakeIdentity::signed_in("alice");
        let first = input.on_click(0.0, 0.0, 1_000, Modifiers::empty(), &vp, &identity, ConnectionState::Open);
        let second = input.on_click(0.0, 0.0, 1_150, Modifiers::empty(), &vp, &identity, ConnectionState::Open);
        let third = input.on_click(0.0, 0.0, 1_200, Modifiers::empty(), &vp, &identity, ConnectionState::Open);
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(third.is_some());
    }

    #[test]
    fn suppressed_click_does_not_advance_debounce_clock() {
        let mut input = controller(200);
        let vp = Viewport::new(4, 4, 1.0);
        let identity = FakeIdentity::signed_in("alice");
        input.on_click(0.0, 0.0, 1_000, Modifiers::empty(), &vp, &identity, ConnectionState::Open);
        // Two suppressed clicks inside the window...
        input.on_click(0.0, 0.0, 1_100, Modifiers::empty(), &vp, &identity, ConnectionState::Open);
        input.on_click(0.0, 0.0, 1_199, Modifiers::empty(), &vp, &identity, ConnectionState::Open);
        // ...must not push back the moment the window reopens.
        assert!(
            input
                .on_click(0.0, 0.0, 1_201, Modifiers::empty(), &vp, &identity, ConnectionState::Open)
                .is_some()
        );
    }

    #[test]
    fn unauthenticated_click_is_suppressed() {
        let mut input = controller(0);
        let vp = Viewport::new(4, 4, 1.0);
        let intent = input.on_click(
            0.0,
            0.0,
            1_000,
            Modifiers::empty(),
            &vp,
            &FakeIdentity::anonymous(),
            ConnectionState::Open,
        );
        assert!(intent.is_none());
    }

    #[test]
    fn click_while_not_open_is_suppressed() {
        let mut input = controller(0);
        let vp = Viewport::new(4, 4, 1.0);
        let identity = FakeIdentity::signed_in("alice");
        for state in [
            ConnectionState::Connecting,
            ConnectionState::Closing,
            ConnectionState::Closed,
        ] {
            assert!(
                input
                    .on_click(0.0, 0.0, 1_000, Modifiers::empty(), &vp, &identity, state)
                    .is_none(),
                "state {state:?} should gate sends"
            );
        }
    }

    #[test]
    fn user_without_uid_gets_sentinel_label() {
        let mut input = controller(0);
        let vp = Viewport::new(4, 4, 1.0);
        let identity = FakeIdentity {
            user: Some(UserInfo {
                display_name: "ghost".to_string(),
                uid: None,
            }),
        };
        let intent = input
            .on_click(0.0, 0.0, 0, Modifiers::empty(), &vp, &identity, ConnectionState::Open)
            .expect("qualifying click");
        assert_eq!(intent.user, UNKNOWN_USER);
    }

    #[test]
    fn hover_shows_owner_tooltip_at_pointer() {
        let mut input = controller(0);
        let vp = Viewport::new(4, 4, 1.0);
        let grid = grid_with_owner(5, "alice");
        let tooltip = input
            .on_pointer_move(1.4, 1.9, Modifiers::empty(), &vp, &grid)
            .expect("owned cell");
        assert_eq!(tooltip.owner, "alice");
        assert_eq!((tooltip.x, tooltip.y), (1.4, 1.9));
    }

    #[test]
    fn hover_over_unowned_cell_hides_tooltip() {
        let mut input = controller(0);
        let vp = Viewport::new(4, 4, 1.0);
        let grid = grid_with_owner(5, "alice");
        assert!(
            input
                .on_pointer_move(0.0, 0.0, Modifiers::empty(), &vp, &grid)
                .is_none()
        );
        assert_eq!(input.hover_index(), Some(0));
    }

    #[test]
    fn tooltip_tracks_owner_changes_without_new_hover() {
        let mut input = controller(0);
        let vp = Viewport::new(4, 4, 1.0);
        let before = grid_with_owner(5, "alice");
        input.on_pointer_move(1.0, 1.0, Modifiers::empty(), &vp, &before);
        assert_eq!(input.tooltip(&before), Some("alice"));

        // Owners changed while the pointer stayed put.
        let after = grid_with_owner(5, "bob");
        assert_eq!(input.tooltip(&after), Some("bob"));
    }

    #[test]
    fn tooltip_feature_flag_disables_lookup() {
        let mut input = InputController::new(InputConfig {
            enable_ownership_tooltip: false,
            ..InputConfig::default()
        });
        let vp = Viewport::new(4, 4, 1.0);
        let grid = grid_with_owner(5, "alice");
        assert!(
            input
                .on_pointer_move(1.0, 1.0, Modifiers::empty(), &vp, &grid)
                .is_none()
        );
        assert!(input.tooltip(&grid).is_none());
    }

    #[test]
    fn wheel_zooms_when_enabled() {
        let mut input = controller(0);
        let mut vp = Viewport::new(4, 4, 1.0);
        assert_eq!(input.on_wheel(-1, &mut vp), Some(2.0));
        assert_eq!(vp.scale(), 2.0);
    }

    #[test]
    fn wheel_is_ignored_when_zoom_disabled() {
        let mut input = InputController::new(InputConfig {
            enable_zoom: false,
            ..InputConfig::default()
        });
        let mut vp = Viewport::new(4, 4, 1.0);
        assert_eq!(input.on_wheel(-1, &mut vp), None);
        assert_eq!(vp.scale(), 1.0);
    }

    #[test]
    fn focus_loss_clears_modifiers_and_hover() {
        let mut input = controller(0);
        let vp = Viewport::new(4, 4, 1.0);
        let grid = grid_with_owner(5, "alice");
        input.on_pointer_move(1.0, 1.0, Modifiers::SHIFT | Modifiers::CTRL, &vp, &grid);
        assert_eq!(input.modifiers(), Modifiers::SHIFT | Modifiers::CTRL);

        input.on_focus(false);
        assert_eq!(input.modifiers(), Modifiers::empty());
        assert_eq!(input.hover_index(), None);
    }

    #[test]
    fn pointer_event_json_roundtrip_is_stable() {
        let ev = PointerEventJson::Click {
            x: 3.5,
            y: 7.0,
            mods: Modifiers::SHIFT.bits(),
            at_ms: 1_000,
        };
        let j1 = ev.to_json_string().expect("serialize");
        let j2 = ev.to_json_string().expect("serialize");
        assert_eq!(j1, j2);
        let back = PointerEventJson::from_json_str(&j1).expect("deserialize");
        assert_eq!(back, ev);
    }

    proptest! {
        #[test]
        fn clicks_within_window_emit_exactly_one_intent(
            offsets in prop::collection::vec(0u64..200, 1..32)
        ) {
            let mut input = controller(200);
            let vp = Viewport::new(4, 4, 1.0);
            let identity = FakeIdentity::signed_in("alice");
            let mut emitted = 0;
            for offset in offsets {
                if input
                    .on_click(0.0, 0.0, 1_000 + offset, Modifiers::empty(), &vp, &identity, ConnectionState::Open)
                    .is_some()
                {
                    emitted += 1;
                }
            }
            prop_assert_eq!(emitted, 1);
        }
    }
}
