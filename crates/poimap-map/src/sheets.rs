//! Bottom-sheet coordinator.
//!
//! Sheets are registered once and never removed. Opening a sheet always
//! closes every other registered sheet first, so at most one is expanded.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetId {
    Detail,
    Location,
    DataForm,
}

impl SheetId {
    pub const ALL: [SheetId; 3] = [SheetId::Detail, SheetId::Location, SheetId::DataForm];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SheetId::Detail => "detail",
            SheetId::Location => "location",
            SheetId::DataForm => "dataform",
        }
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index the sheet SDK reports for a fully dismissed sheet.
pub const CLOSED_INDEX: i32 = -1;

/// A live sheet handle from the UI layer.
pub trait SheetSurface {
    fn expand(&mut self);
    fn close(&mut self);
}

/// Sheet handle with no UI behind it. Clones share state, so a caller can
/// keep one to observe what the coordinator did.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSheet {
    expanded: Rc<Cell<bool>>,
}

impl HeadlessSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }
}

impl SheetSurface for HeadlessSheet {
    fn expand(&mut self) {
        self.expanded.set(true);
    }

    fn close(&mut self) {
        self.expanded.set(false);
    }
}

struct Entry {
    id: SheetId,
    surface: Box<dyn SheetSurface>,
    open: bool,
}

#[derive(Default)]
pub struct SheetCoordinator {
    entries: Vec<Entry>,
}

impl fmt::Debug for SheetCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (e.id, e.open)))
            .finish()
    }
}

impl SheetCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `surface` under `id`. A second registration replaces the
    /// handle but keeps the slot.
    pub fn register(&mut self, id: SheetId, surface: Box<dyn SheetSurface>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            tracing::warn!(sheet = %id, "sheet registered twice, replacing handle");
            entry.surface = surface;
            entry.open = false;
            return;
        }
        self.entries.push(Entry {
            id,
            surface,
            open: false,
        });
    }

    #[must_use]
    pub fn is_registered(&self, id: SheetId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Closes every other sheet, then expands `id`. Returns `false` when
    /// `id` was never registered; the other sheets are closed regardless.
    pub fn open(&mut self, id: SheetId) -> bool {
        for entry in self.entries.iter_mut().filter(|e| e.id != id) {
            entry.surface.close();
            entry.open = false;
        }
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.surface.expand();
                entry.open = true;
                tracing::debug!(sheet = %id, "sheet opened");
                true
            }
            None => {
                tracing::warn!(sheet = %id, "open requested for unregistered sheet");
                false
            }
        }
    }

    /// Closes `id`, or every sheet when `None`.
    pub fn close(&mut self, id: Option<SheetId>) {
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| id.is_none_or(|target| target == e.id))
        {
            entry.surface.close();
            entry.open = false;
        }
    }

    #[must_use]
    pub fn is_open(&self, id: SheetId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.open)
    }

    /// The expanded sheet, if any.
    #[must_use]
    pub fn open_sheet(&self) -> Option<SheetId> {
        self.entries.iter().find(|e| e.open).map(|e| e.id)
    }

    /// Tracks the index the sheet SDK reports. Returns `Some(id)` when an
    /// open sheet was dismissed by the user so callers can react.
    ///
    /// Only closing is taken from the SDK. Snap-point changes and late
    /// callbacks never mark a sheet open; [`SheetCoordinator::open`] does.
    pub fn on_index_changed(&mut self, id: SheetId, index: i32) -> Option<SheetId> {
        if index != CLOSED_INDEX {
            return None;
        }
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        let was_open = entry.open;
        entry.open = false;
        was_open.then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> (SheetCoordinator, [HeadlessSheet; 3]) {
        let handles = [HeadlessSheet::new(), HeadlessSheet::new(), HeadlessSheet::new()];
        let mut sheets = SheetCoordinator::new();
        for (id, handle) in SheetId::ALL.into_iter().zip(handles.iter()) {
            sheets.register(id, Box::new(handle.clone()));
        }
        (sheets, handles)
    }

    #[test]
    fn open_leaves_exactly_one_sheet_expanded() {
        let (mut sheets, handles) = registered();
        for order in [
            [SheetId::Detail, SheetId::Location, SheetId::DataForm],
            [SheetId::DataForm, SheetId::DataForm, SheetId::Detail],
            [SheetId::Location, SheetId::Detail, SheetId::Location],
        ] {
            for id in order {
                sheets.open(id);
                let expanded = handles.iter().filter(|h| h.is_expanded()).count();
                assert_eq!(expanded, 1);
                assert_eq!(sheets.open_sheet(), Some(id));
            }
        }
    }

    #[test]
    fn close_without_id_closes_all() {
        let (mut sheets, handles) = registered();
        sheets.open(SheetId::Location);
        sheets.close(None);
        assert!(handles.iter().all(|h| !h.is_expanded()));
        assert_eq!(sheets.open_sheet(), None);
    }

    #[test]
    fn close_named_sheet_only() {
        let (mut sheets, handles) = registered();
        sheets.open(SheetId::Detail);
        sheets.close(Some(SheetId::DataForm));
        assert!(handles[0].is_expanded());
        sheets.close(Some(SheetId::Detail));
        assert!(!handles[0].is_expanded());
    }

    #[test]
    fn opening_unregistered_sheet_still_closes_others() {
        let handle = HeadlessSheet::new();
        let mut sheets = SheetCoordinator::new();
        sheets.register(SheetId::Detail, Box::new(handle.clone()));
        sheets.open(SheetId::Detail);
        assert!(!sheets.open(SheetId::DataForm));
        assert!(!handle.is_expanded());
    }

    #[test]
    fn gesture_dismissal_is_reported_once() {
        let (mut sheets, _) = registered();
        sheets.open(SheetId::Detail);
        assert_eq!(sheets.on_index_changed(SheetId::Detail, 0), None);
        assert_eq!(
            sheets.on_index_changed(SheetId::Detail, CLOSED_INDEX),
            Some(SheetId::Detail)
        );
        assert_eq!(sheets.on_index_changed(SheetId::Detail, CLOSED_INDEX), None);
        assert!(!sheets.is_open(SheetId::Detail));
    }

    #[test]
    fn late_index_report_does_not_reopen_a_closed_sheet() {
        let (mut sheets, handles) = registered();
        sheets.open(SheetId::Detail);
        sheets.open(SheetId::Location);

        assert_eq!(sheets.on_index_changed(SheetId::Detail, 1), None);
        assert!(!sheets.is_open(SheetId::Detail));
        assert_eq!(sheets.open_sheet(), Some(SheetId::Location));
        assert!(!handles[0].is_expanded());
        assert!(handles[1].is_expanded());
    }

    #[test]
    fn sheet_ids_use_registry_names() {
        assert_eq!(SheetId::DataForm.to_string(), "dataform");
        assert_eq!(
            serde_json::to_value(SheetId::Location).unwrap(),
            serde_json::json!("location")
        );
    }
}
