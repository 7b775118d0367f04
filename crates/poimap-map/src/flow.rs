//! Suggestion workflow orchestrator.
//!
//! [`SuggestionFlow`] owns the screen store, the sheet coordinator and the
//! camera, and sequences the two suggestion journeys:
//!
//! - new POI: `VIEWING -> SUGGESTING -> FORM_POI_NEW -> VIEWING`
//! - change: `VIEWING -> FORM_POI_CHANGE -> VIEWING`, from a POI's detail sheet
//!
//! Sheet and camera side effects run after every operation, keyed on the
//! pair `(screen state, suggested location)`: they fire once per change of
//! that pair, never from the reducer.

use poimap_client::ClientError;
use poimap_core::geometry;
use poimap_core::{Coordinate, Poi};

use crate::backend::PoiBackend;
use crate::camera::CameraController;
use crate::error::FlowError;
use crate::forms::{ChangeForm, NewPoiForm};
use crate::notice::{CancelDialog, CancelOrigin, Snackbar};
use crate::screen::{ScreenAction, ScreenState, ScreenStore};
use crate::sheets::{SheetCoordinator, SheetId};

/// What a map tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The candidate location moved to the tap.
    Relocated,
    /// The tap fell outside the map's area polygon and was dropped.
    OutsideArea,
    /// Taps do not relocate anything in the current screen state.
    Ignored,
}

type EffectKey = (ScreenState, Option<[f64; 2]>);

#[derive(Debug)]
pub struct SuggestionFlow {
    screen: ScreenStore,
    sheets: SheetCoordinator,
    camera: CameraController,
    suggested_location: Option<[f64; 2]>,
    active_poi: Option<Poi>,
    new_form: NewPoiForm,
    change_form: Option<ChangeForm>,
    submitting: bool,
    dialog: Option<CancelDialog>,
    snackbar: Option<Snackbar>,
    applied: EffectKey,
}

impl SuggestionFlow {
    #[must_use]
    pub fn new(sheets: SheetCoordinator, camera: CameraController) -> Self {
        Self {
            screen: ScreenStore::default(),
            sheets,
            camera,
            suggested_location: None,
            active_poi: None,
            new_form: NewPoiForm::default(),
            change_form: None,
            submitting: false,
            dialog: None,
            snackbar: None,
            applied: (ScreenState::Viewing, None),
        }
    }

    #[must_use]
    pub fn screen_state(&self) -> ScreenState {
        self.screen.state()
    }

    #[must_use]
    pub fn can_interact_with_map(&self) -> bool {
        self.screen.state().can_interact_with_map()
    }

    #[must_use]
    pub fn suggested_location(&self) -> Option<[f64; 2]> {
        self.suggested_location
    }

    #[must_use]
    pub fn active_poi(&self) -> Option<&Poi> {
        self.active_poi.as_ref()
    }

    #[must_use]
    pub fn sheets(&self) -> &SheetCoordinator {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut SheetCoordinator {
        &mut self.sheets
    }

    #[must_use]
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    #[must_use]
    pub fn new_form(&self) -> &NewPoiForm {
        &self.new_form
    }

    pub fn new_form_mut(&mut self) -> &mut NewPoiForm {
        &mut self.new_form
    }

    #[must_use]
    pub fn change_form(&self) -> Option<&ChangeForm> {
        self.change_form.as_ref()
    }

    pub fn change_form_mut(&mut self) -> Option<&mut ChangeForm> {
        self.change_form.as_mut()
    }

    /// Disables the submit control while a request is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub fn cancel_dialog(&self) -> Option<&CancelDialog> {
        self.dialog.as_ref()
    }

    #[must_use]
    pub fn snackbar(&self) -> Option<&Snackbar> {
        self.snackbar.as_ref()
    }

    pub fn dismiss_snackbar(&mut self) {
        self.snackbar = None;
    }

    /// Single entry point for screen transitions.
    pub fn dispatch(&mut self, action: ScreenAction) {
        self.screen.dispatch(action);
        self.run_effects();
    }

    /// "Suggest POI": seeds the candidate with the user's last fix.
    ///
    /// # Errors
    ///
    /// [`FlowError::WrongScreen`] unless viewing.
    pub fn start_suggestion(&mut self, user_location: Option<[f64; 2]>) -> Result<(), FlowError> {
        self.require(&[ScreenState::Viewing, ScreenState::SelectingPoi])?;
        self.suggested_location = user_location;
        self.dispatch(ScreenAction::suggesting());
        Ok(())
    }

    /// Relocates the candidate when suggesting and the tap lies inside
    /// `area`. With no area configured every tap is accepted.
    pub fn handle_map_tap(&mut self, point: [f64; 2], area: Option<&[Coordinate]>) -> TapOutcome {
        if self.screen.state() != ScreenState::Suggesting {
            return TapOutcome::Ignored;
        }
        if let Some(ring) = area {
            if !geometry::contains(ring, Coordinate::from_lng_lat(point[0], point[1])) {
                tracing::debug!(lng = point[0], lat = point[1], "tap outside map area ignored");
                return TapOutcome::OutsideArea;
            }
        }
        self.suggested_location = Some(point);
        self.run_effects();
        TapOutcome::Relocated
    }

    /// Opens the detail sheet for `poi`. Returns `false` when POI
    /// selection is not available in the current screen state.
    pub fn select_poi(&mut self, poi: Poi) -> bool {
        if !self.screen.state().allows_poi_selection() {
            return false;
        }
        tracing::debug!(poi = %poi.guid, "POI selected");
        self.active_poi = Some(poi);
        self.sheets.open(SheetId::Detail);
        true
    }

    /// Confirm button of the location sheet.
    ///
    /// # Errors
    ///
    /// [`FlowError::WrongScreen`] unless suggesting;
    /// [`FlowError::MissingLocation`] without a candidate.
    pub fn confirm_location(&mut self) -> Result<(), FlowError> {
        self.require(&[ScreenState::Suggesting])?;
        if self.suggested_location.is_none() {
            return Err(FlowError::MissingLocation);
        }
        self.dispatch(ScreenAction::form_new_poi());
        Ok(())
    }

    /// Shows the "Abandon Suggestion" dialog.
    pub fn request_cancel(&mut self, origin: CancelOrigin) {
        self.dialog = Some(CancelDialog { origin });
    }

    /// "Yes" on the cancel dialog. A cancelled new-POI form goes back to
    /// picking a location; everything else returns to viewing.
    pub fn confirm_cancel(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        let action = match (dialog.origin, self.screen.state()) {
            (CancelOrigin::DataForm, ScreenState::FormPoiNew) => {
                self.sheets.close(None);
                ScreenAction::suggesting()
            }
            _ => ScreenAction::viewing(),
        };
        self.dispatch(action);
    }

    /// "No" on the cancel dialog: nothing changes.
    pub fn dismiss_cancel(&mut self) {
        self.dialog = None;
    }

    /// Validates the new-POI form and marks the submission in flight.
    ///
    /// # Errors
    ///
    /// [`FlowError::AlreadySubmitting`], [`FlowError::WrongScreen`],
    /// [`FlowError::MissingLocation`], [`FlowError::NoActiveMap`] or
    /// [`FlowError::InvalidForm`]. None of them change any state.
    pub fn begin_new_submission(
        &mut self,
        map_id: Option<&str>,
    ) -> Result<poimap_core::SuggestionRfc, FlowError> {
        if self.submitting {
            return Err(FlowError::AlreadySubmitting);
        }
        self.require(&[ScreenState::FormPoiNew])?;
        let location = self.suggested_location.ok_or(FlowError::MissingLocation)?;
        let map_id = map_id
            .filter(|id| !id.is_empty())
            .ok_or(FlowError::NoActiveMap)?;
        let rfc = self.new_form.to_rfc(map_id, location)?;
        self.submitting = true;
        Ok(rfc)
    }

    /// Applies the backend's answer to a new-POI submission.
    ///
    /// # Errors
    ///
    /// [`FlowError::NotSubmitting`] without a matching begin;
    /// [`FlowError::Backend`] passes a rejected submission through after the
    /// failure snackbar is shown.
    pub fn finish_new_submission(&mut self, result: Result<(), ClientError>) -> Result<(), FlowError> {
        self.finish(result)
    }

    /// Starts the change journey for the POI shown in the detail sheet.
    ///
    /// # Errors
    ///
    /// [`FlowError::WrongScreen`] without a selected POI while viewing.
    pub fn start_change_suggestion(&mut self) -> Result<(), FlowError> {
        self.require(&[ScreenState::Viewing, ScreenState::SelectingPoi])?;
        let poi_id = self
            .active_poi
            .as_ref()
            .map(|poi| poi.guid.clone())
            .ok_or(FlowError::WrongScreen(self.screen.state()))?;
        self.change_form = Some(ChangeForm::for_poi(poi_id));
        self.sheets.close(None);
        self.dispatch(ScreenAction::form_change_poi());
        self.sheets.open(SheetId::DataForm);
        Ok(())
    }

    /// Validates the change form and marks the submission in flight.
    ///
    /// # Errors
    ///
    /// [`FlowError::AlreadySubmitting`], [`FlowError::WrongScreen`] or
    /// [`FlowError::InvalidForm`]. None of them change any state.
    pub fn begin_change_submission(&mut self) -> Result<poimap_core::ChangeRfc, FlowError> {
        if self.submitting {
            return Err(FlowError::AlreadySubmitting);
        }
        self.require(&[ScreenState::FormPoiChange])?;
        let form = self
            .change_form
            .as_ref()
            .ok_or(FlowError::WrongScreen(ScreenState::FormPoiChange))?;
        let rfc = form.to_rfc()?;
        self.submitting = true;
        Ok(rfc)
    }

    /// Applies the backend's answer to a change submission. Success also
    /// closes the detail sheet.
    ///
    /// # Errors
    ///
    /// Same as [`SuggestionFlow::finish_new_submission`].
    pub fn finish_change_submission(
        &mut self,
        result: Result<(), ClientError>,
    ) -> Result<(), FlowError> {
        self.finish(result)
    }

    /// Submits the new-POI form through `backend`.
    ///
    /// # Errors
    ///
    /// See [`SuggestionFlow::begin_new_submission`] and
    /// [`SuggestionFlow::finish_new_submission`].
    pub async fn submit_new<B: PoiBackend>(
        &mut self,
        backend: &B,
        map_id: Option<&str>,
    ) -> Result<(), FlowError> {
        let rfc = self.begin_new_submission(map_id)?;
        let result = backend.submit_suggestion(&rfc).await;
        self.finish_new_submission(result)
    }

    /// Submits the change form through `backend`.
    ///
    /// # Errors
    ///
    /// See [`SuggestionFlow::begin_change_submission`] and
    /// [`SuggestionFlow::finish_change_submission`].
    pub async fn submit_change<B: PoiBackend>(&mut self, backend: &B) -> Result<(), FlowError> {
        let rfc = self.begin_change_submission()?;
        let result = backend.submit_change(&rfc).await;
        self.finish_change_submission(result)
    }

    /// Keeps state in line with a sheet the user swiped away.
    pub fn on_sheet_index_changed(&mut self, id: SheetId, index: i32) {
        let Some(dismissed) = self.sheets.on_index_changed(id, index) else {
            return;
        };
        tracing::debug!(sheet = %dismissed, "sheet dismissed by gesture");
        match (dismissed, self.screen.state()) {
            (SheetId::Detail, _) => self.active_poi = None,
            (SheetId::Location, ScreenState::Suggesting)
            | (SheetId::DataForm, ScreenState::FormPoiChange) => {
                self.dispatch(ScreenAction::viewing());
            }
            _ => {}
        }
    }

    fn finish(&mut self, result: Result<(), ClientError>) -> Result<(), FlowError> {
        if !self.submitting {
            return Err(FlowError::NotSubmitting);
        }
        self.submitting = false;
        match result {
            Ok(()) => {
                tracing::info!(screen = ?self.screen.state(), "suggestion submitted");
                self.snackbar = Some(Snackbar::submitted());
                self.dispatch(ScreenAction::viewing());
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "suggestion submission failed");
                self.snackbar = Some(Snackbar::failed());
                Err(FlowError::Backend(error))
            }
        }
    }

    fn require(&self, allowed: &[ScreenState]) -> Result<(), FlowError> {
        let state = self.screen.state();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(FlowError::WrongScreen(state))
        }
    }

    fn run_effects(&mut self) {
        let key = (self.screen.state(), self.suggested_location);
        if key == self.applied {
            return;
        }
        match key {
            (ScreenState::Suggesting, Some(location)) => {
                self.sheets.open(SheetId::Location);
                self.camera.fly_to(location);
            }
            (ScreenState::FormPoiNew, Some(_)) => {
                self.sheets.open(SheetId::DataForm);
            }
            (ScreenState::Viewing | ScreenState::EmptyMap, _) => {
                self.sheets.close(None);
                self.suggested_location = None;
                self.active_poi = None;
                self.change_form = None;
                self.new_form = NewPoiForm::default();
                self.dialog = None;
            }
            _ => {}
        }
        self.applied = (self.screen.state(), self.suggested_location);
    }
}

#[cfg(test)]
#[path = "flow_test.rs"]
mod tests;
