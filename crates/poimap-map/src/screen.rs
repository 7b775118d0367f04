//! Screen-state machine.
//!
//! One enumerated mode governs which sheets are open and which map
//! interactions are allowed. The reducer is a pure projection of the last
//! dispatched payload; deciding whether a jump is legal belongs to whoever
//! dispatches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenState {
    /// Browsing the map or a POI's details.
    #[default]
    Viewing,
    /// Picking a location for a new POI.
    Suggesting,
    SelectingPoi,
    FormPoiNew,
    FormPoiChange,
    /// No map could be resolved for this session.
    EmptyMap,
}

impl ScreenState {
    /// Pan, zoom and taps reach the map only while viewing or suggesting.
    #[must_use]
    pub fn can_interact_with_map(self) -> bool {
        matches!(self, ScreenState::Viewing | ScreenState::Suggesting)
    }

    /// `SELECTING_POI` behaves like `VIEWING` for POI selection.
    #[must_use]
    pub fn allows_poi_selection(self) -> bool {
        matches!(self, ScreenState::Viewing | ScreenState::SelectingPoi)
    }

    #[must_use]
    pub fn is_form(self) -> bool {
        matches!(self, ScreenState::FormPoiNew | ScreenState::FormPoiChange)
    }
}

/// `{ "type": "SET_SCREEN", "payload": <state> }` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenAction {
    SetScreen(ScreenState),
}

impl ScreenAction {
    #[must_use]
    pub fn viewing() -> Self {
        Self::SetScreen(ScreenState::Viewing)
    }

    #[must_use]
    pub fn suggesting() -> Self {
        Self::SetScreen(ScreenState::Suggesting)
    }

    #[must_use]
    pub fn selecting_poi() -> Self {
        Self::SetScreen(ScreenState::SelectingPoi)
    }

    #[must_use]
    pub fn form_new_poi() -> Self {
        Self::SetScreen(ScreenState::FormPoiNew)
    }

    #[must_use]
    pub fn form_change_poi() -> Self {
        Self::SetScreen(ScreenState::FormPoiChange)
    }

    #[must_use]
    pub fn empty_map() -> Self {
        Self::SetScreen(ScreenState::EmptyMap)
    }
}

/// Pure reducer: `(state, action) -> state`.
#[must_use]
pub fn reduce(_state: ScreenState, action: ScreenAction) -> ScreenState {
    match action {
        ScreenAction::SetScreen(next) => next,
    }
}

/// A change of screen state produced by [`ScreenStore::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ScreenState,
    pub to: ScreenState,
}

/// Holder of the current [`ScreenState`]; the single dispatch entry point.
#[derive(Debug, Default)]
pub struct ScreenStore {
    state: ScreenState,
}

impl ScreenStore {
    #[must_use]
    pub fn new(initial: ScreenState) -> Self {
        Self { state: initial }
    }

    #[must_use]
    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Applies `action`, returning the transition when the state changed.
    pub fn dispatch(&mut self, action: ScreenAction) -> Option<Transition> {
        let from = self.state;
        self.state = reduce(from, action);
        tracing::debug!(?from, to = ?self.state, "screen state dispatched");
        (from != self.state).then_some(Transition {
            from,
            to: self.state,
        })
    }
}
