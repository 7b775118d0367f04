//! Device location as a scoped subscription.
//!
//! [`LocationWatch::start`] asks for permission and subscribes once; dropping
//! the watch clears the platform subscription. Samples are published on a
//! `tokio::sync::watch` channel so readers always see the latest fix.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location provider unavailable: {0}")]
    Unavailable(String),
}

/// Platform watch handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Minimum movement in meters between samples.
    pub distance_filter_m: f64,
    pub interval_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            distance_filter_m: 5.0,
            interval_ms: 3000,
        }
    }
}

/// Where a [`LocationSource`] delivers samples.
#[derive(Debug, Clone)]
pub struct LocationSink {
    tx: Arc<watch::Sender<Option<[f64; 2]>>>,
}

impl LocationSink {
    /// Publishes a `[lng, lat]` fix, replacing the previous one.
    pub fn publish(&self, longitude: f64, latitude: f64) {
        self.tx.send_replace(Some([longitude, latitude]));
    }

    /// Position errors never reach the user.
    pub fn report_error(&self, error: &LocationError) {
        tracing::warn!(%error, "location sample failed");
    }
}

/// The device's geolocation service.
pub trait LocationSource {
    /// # Errors
    ///
    /// [`LocationError::Unavailable`] if the platform cannot be asked.
    fn request_permission(&mut self) -> Result<bool, LocationError>;

    /// # Errors
    ///
    /// [`LocationError`] if the subscription cannot be created.
    fn watch_position(
        &mut self,
        options: &WatchOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationError>;

    fn clear_watch(&mut self, id: WatchId);
}

/// Owns the single location subscription for the app's lifetime.
pub struct LocationWatch {
    source: Box<dyn LocationSource>,
    watch_id: Option<WatchId>,
    has_permission: bool,
    rx: watch::Receiver<Option<[f64; 2]>>,
}

impl std::fmt::Debug for LocationWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationWatch")
            .field("watch_id", &self.watch_id)
            .field("has_permission", &self.has_permission)
            .field("latest", &*self.rx.borrow())
            .finish_non_exhaustive()
    }
}

impl LocationWatch {
    /// Requests permission and, if granted, subscribes to position updates.
    /// Failures leave a watch with no fix; they are logged, not returned.
    pub fn start(mut source: Box<dyn LocationSource>, options: &WatchOptions) -> Self {
        let (tx, rx) = watch::channel(None);

        let has_permission = match source.request_permission() {
            Ok(granted) => granted,
            Err(error) => {
                tracing::warn!(%error, "location permission request failed");
                false
            }
        };

        let watch_id = if has_permission {
            match source.watch_position(options, LocationSink { tx: Arc::new(tx) }) {
                Ok(id) => Some(id),
                Err(error) => {
                    tracing::warn!(%error, "location watch could not start");
                    None
                }
            }
        } else {
            tracing::info!("location permission not granted");
            None
        };

        Self {
            source,
            watch_id,
            has_permission,
            rx,
        }
    }

    #[must_use]
    pub fn has_permission(&self) -> bool {
        self.has_permission
    }

    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watch_id.is_some()
    }

    /// Most recent `[lng, lat]` fix.
    #[must_use]
    pub fn latest(&self) -> Option<[f64; 2]> {
        *self.rx.borrow()
    }

    /// A receiver that is notified on every new fix.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<[f64; 2]>> {
        self.rx.clone()
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        if let Some(id) = self.watch_id.take() {
            self.source.clear_watch(id);
            tracing::debug!(watch_id = id.0, "location watch cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Platform {
        granted: bool,
        watches: u32,
        cleared: Vec<WatchId>,
        sink: Option<LocationSink>,
    }

    struct FakeSource(Rc<RefCell<Platform>>);

    impl LocationSource for FakeSource {
        fn request_permission(&mut self) -> Result<bool, LocationError> {
            Ok(self.0.borrow().granted)
        }

        fn watch_position(
            &mut self,
            _options: &WatchOptions,
            sink: LocationSink,
        ) -> Result<WatchId, LocationError> {
            let mut platform = self.0.borrow_mut();
            platform.watches += 1;
            platform.sink = Some(sink);
            Ok(WatchId(7))
        }

        fn clear_watch(&mut self, id: WatchId) {
            self.0.borrow_mut().cleared.push(id);
        }
    }

    fn platform(granted: bool) -> Rc<RefCell<Platform>> {
        Rc::new(RefCell::new(Platform {
            granted,
            ..Platform::default()
        }))
    }

    #[test]
    fn subscribes_once_and_clears_on_drop() {
        let state = platform(true);
        let watch =
            LocationWatch::start(Box::new(FakeSource(state.clone())), &WatchOptions::default());
        assert!(watch.is_watching());
        assert_eq!(state.borrow().watches, 1);

        drop(watch);
        assert_eq!(state.borrow().cleared, vec![WatchId(7)]);
    }

    #[test]
    fn samples_are_visible_as_latest() {
        let state = platform(true);
        let watch =
            LocationWatch::start(Box::new(FakeSource(state.clone())), &WatchOptions::default());
        assert_eq!(watch.latest(), None);

        let sink = state.borrow().sink.clone().unwrap();
        sink.publish(5.04, 51.64);
        sink.publish(5.05, 51.65);
        assert_eq!(watch.latest(), Some([5.05, 51.65]));
    }

    #[test]
    fn denied_permission_never_subscribes() {
        let state = platform(false);
        let watch =
            LocationWatch::start(Box::new(FakeSource(state.clone())), &WatchOptions::default());
        assert!(!watch.has_permission());
        assert!(!watch.is_watching());
        drop(watch);
        assert_eq!(state.borrow().watches, 0);
        assert!(state.borrow().cleared.is_empty());
    }
}
