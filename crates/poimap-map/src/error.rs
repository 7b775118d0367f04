use poimap_client::ClientError;
use thiserror::Error;

use crate::forms::FormError;
use crate::screen::ScreenState;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("no submission is in flight")]
    NotSubmitting,

    #[error("not available while in {0:?}")]
    WrongScreen(ScreenState),

    #[error("no suggested location")]
    MissingLocation,

    #[error("no active map")]
    NoActiveMap,

    #[error(transparent)]
    InvalidForm(#[from] FormError),

    #[error(transparent)]
    Backend(#[from] ClientError),
}
