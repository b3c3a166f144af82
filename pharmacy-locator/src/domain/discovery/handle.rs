//! Caller-side handle for a running discovery controller.

use tokio::sync::{mpsc, watch};

use crate::domain::{Coordinate, Pharmacy};

/// State published after every controller mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverySnapshot {
    /// Pharmacies in the order they were first shown.
    pub pharmacies: Vec<Pharmacy>,
    /// Background fetches and enrichments still outstanding.
    pub pending_tasks: usize,
    /// Nearby fetches that have completed, successfully or not.
    pub completed_fetches: u64,
}

impl DiscoverySnapshot {
    /// Whether no background work is outstanding.
    pub fn is_settled(&self) -> bool {
        self.pending_tasks == 0
    }

    /// First pharmacy named `name`, if shown.
    pub fn find(&self, name: &str) -> Option<&Pharmacy> {
        self.pharmacies.iter().find(|pharmacy| pharmacy.name == name)
    }
}

/// Messages accepted by the controller loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum DiscoveryCommand {
    DeviceLocated(Coordinate),
    CameraMoved(Coordinate),
    Recenter,
    FetchNow(Coordinate),
    Shutdown,
}

/// Returned when the controller loop has already exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("discovery controller has stopped")]
pub struct DiscoveryStopped;

/// Cloneable handle used to drive the controller and observe its state.
#[derive(Debug, Clone)]
pub struct DiscoveryHandle {
    commands: mpsc::UnboundedSender<DiscoveryCommand>,
    snapshots: watch::Receiver<DiscoverySnapshot>,
}

impl DiscoveryHandle {
    pub(super) fn new(
        commands: mpsc::UnboundedSender<DiscoveryCommand>,
        snapshots: watch::Receiver<DiscoverySnapshot>,
    ) -> Self {
        Self {
            commands,
            snapshots,
        }
    }

    /// Report a device location fix.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryStopped`] when the controller has exited.
    pub fn device_located(&self, coordinate: Coordinate) -> Result<(), DiscoveryStopped> {
        self.send(DiscoveryCommand::DeviceLocated(coordinate))
    }

    /// Report a camera move; fetches are debounced.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryStopped`] when the controller has exited.
    pub fn camera_moved(&self, coordinate: Coordinate) -> Result<(), DiscoveryStopped> {
        self.send(DiscoveryCommand::CameraMoved(coordinate))
    }

    /// Move the camera back to the device location.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryStopped`] when the controller has exited.
    pub fn recenter(&self) -> Result<(), DiscoveryStopped> {
        self.send(DiscoveryCommand::Recenter)
    }

    /// Fetch around `coordinate` immediately, bypassing the debouncer.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryStopped`] when the controller has exited.
    pub fn fetch_now(&self, coordinate: Coordinate) -> Result<(), DiscoveryStopped> {
        self.send(DiscoveryCommand::FetchNow(coordinate))
    }

    /// Ask the controller loop to exit. In-flight tasks are not cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryStopped`] when the controller has already exited.
    pub fn shutdown(&self) -> Result<(), DiscoveryStopped> {
        self.send(DiscoveryCommand::Shutdown)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> DiscoverySnapshot {
        self.snapshots.borrow().clone()
    }

    /// Independent receiver for snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<DiscoverySnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryStopped`] when the controller exits first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&DiscoverySnapshot) -> bool,
    ) -> Result<DiscoverySnapshot, DiscoveryStopped> {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(predicate)
            .await
            .map_err(|_| DiscoveryStopped)?
            .clone();
        Ok(snapshot)
    }

    fn send(&self, command: DiscoveryCommand) -> Result<(), DiscoveryStopped> {
        self.commands.send(command).map_err(|_| DiscoveryStopped)
    }
}
