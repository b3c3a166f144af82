//! Device position and map camera tracking.

use super::debounce::DebounceScheduler;
use super::pharmacy::Coordinate;

/// Owns the latest device fix and camera centre and turns camera movement
/// into debounced fetch triggers.
#[derive(Debug)]
pub struct LocationTracker {
    device: Option<Coordinate>,
    camera: Option<Coordinate>,
    debouncer: DebounceScheduler<Coordinate>,
}

impl LocationTracker {
    /// Create a tracker that routes camera changes through `debouncer`.
    pub fn new(debouncer: DebounceScheduler<Coordinate>) -> Self {
        Self {
            device: None,
            camera: None,
            debouncer,
        }
    }

    /// Latest device position.
    pub fn device(&self) -> Option<Coordinate> {
        self.device
    }

    /// Current camera centre.
    pub fn camera(&self) -> Option<Coordinate> {
        self.camera
    }

    /// Record a device fix. The first fix also centres the camera there.
    pub fn device_located(&mut self, coordinate: Coordinate) {
        let first_fix = self.device.is_none();
        self.device = Some(coordinate);
        if first_fix {
            self.camera_moved(coordinate);
        }
    }

    /// Record a camera move and schedule a debounced fetch for it.
    pub fn camera_moved(&mut self, coordinate: Coordinate) {
        self.camera = Some(coordinate);
        self.debouncer.schedule(coordinate);
    }

    /// Move the camera back to the device position.
    ///
    /// Returns `false` when no device fix has been recorded yet.
    pub fn recenter(&mut self) -> bool {
        match self.device {
            Some(device) => {
                self.camera_moved(device);
                true
            }
            None => false,
        }
    }

    /// Drop any camera move still waiting out the quiet window.
    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    //! Camera and device bookkeeping.

    use std::time::Duration;

    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    const WINDOW: Duration = Duration::from_millis(800);

    fn tracker() -> (LocationTracker, mpsc::UnboundedReceiver<Coordinate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (LocationTracker::new(DebounceScheduler::new(WINDOW, tx)), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn first_fix_centres_camera_and_triggers_fetch() {
        let (mut tracker, mut rx) = tracker();
        let home = Coordinate::new(37.5665, 126.978);

        tracker.device_located(home);
        tracker.device_located(Coordinate::new(37.57, 126.98));
        assert_eq!(tracker.camera(), Some(home));

        sleep(WINDOW * 2).await;
        assert_eq!(rx.try_recv().ok(), Some(home));
        assert!(rx.try_recv().is_err(), "later fixes do not move the camera");
    }

    #[tokio::test(start_paused = true)]
    async fn recenter_requires_a_device_fix() {
        let (mut tracker, mut rx) = tracker();
        assert!(!tracker.recenter());

        let home = Coordinate::new(35.1796, 129.0756);
        tracker.device_located(home);
        tracker.camera_moved(Coordinate::new(35.2, 129.1));
        assert!(tracker.recenter());
        assert_eq!(tracker.camera(), Some(home));

        sleep(WINDOW * 2).await;
        assert_eq!(rx.try_recv().ok(), Some(home));
    }
}
