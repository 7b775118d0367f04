//! Snackbar and confirmation-dialog state surfaced to the UI.

use serde::Serialize;

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Your suggestion has been submitted!";
pub const SUBMIT_FAILURE_MESSAGE: &str = "Your suggestion could not be submitted!";
pub const CANCEL_DIALOG_TITLE: &str = "Abandon Suggestion";
pub const CANCEL_DIALOG_BODY: &str = "Are you sure you want to abandon your suggestion?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnackbarKind {
    Success,
    Failure,
}

/// A transient message at the bottom of the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snackbar {
    pub kind: SnackbarKind,
    pub message: String,
}

impl Snackbar {
    #[must_use]
    pub fn submitted() -> Self {
        Self {
            kind: SnackbarKind::Success,
            message: SUBMIT_SUCCESS_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn failed() -> Self {
        Self {
            kind: SnackbarKind::Failure,
            message: SUBMIT_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Where a cancel was requested from; decides where confirming returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOrigin {
    /// The location sheet: confirming abandons the suggestion.
    LocationSheet,
    /// A data form: confirming goes back to picking a location.
    DataForm,
}

/// The "Abandon Suggestion" yes/no dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancelDialog {
    pub origin: CancelOrigin,
}

impl CancelDialog {
    #[must_use]
    pub fn title(&self) -> &'static str {
        CANCEL_DIALOG_TITLE
    }

    #[must_use]
    pub fn body(&self) -> &'static str {
        CANCEL_DIALOG_BODY
    }
}
