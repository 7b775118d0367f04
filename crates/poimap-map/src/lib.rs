//! Interaction core of the map screen: screen-state machine, clustering,
//! camera, sheets, location and the suggestion workflow.

pub mod backend;
pub mod camera;
pub mod cluster;
pub mod error;
pub mod flow;
pub mod forms;
pub mod location;
pub mod notice;
pub mod screen;
pub mod session;
pub mod sheets;
pub mod throttle;

pub use backend::PoiBackend;
pub use camera::{CameraBounds, CameraCommand, CameraController, CameraError, CameraRenderer};
pub use cluster::{ClusterEngine, ClusterEntry, ClusterIndex, ClusterOptions, ViewportBounds};
pub use error::FlowError;
pub use flow::{SuggestionFlow, TapOutcome};
pub use forms::{ChangeForm, FormError, NewPoiForm};
pub use location::{LocationError, LocationSink, LocationSource, LocationWatch, WatchId, WatchOptions};
pub use notice::{CancelDialog, CancelOrigin, Snackbar, SnackbarKind};
pub use screen::{ScreenAction, ScreenState, ScreenStore, Transition};
pub use session::{BackgroundImage, MapResolution, MapSession};
pub use sheets::{HeadlessSheet, SheetCoordinator, SheetId, SheetSurface};
pub use throttle::Throttle;
