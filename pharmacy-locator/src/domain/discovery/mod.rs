//! Discovery controller: the single owner of the pharmacy collection.
//!
//! The controller loop is the only place that mutates the collection or the
//! loaded-keys set. Nearby fetches and enrichments run as independent Tokio
//! tasks and hand their results back over a channel, so every write is
//! serialised through the loop without locks. Completions may arrive in any
//! order; each enrichment writes only the pharmacy it was dispatched for.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use mockable::Clock;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::collection::PharmacyCollection;
use super::debounce::DebounceScheduler;
use super::enrichment::{DetailEnricher, EnrichmentError};
use super::location::LocationTracker;
use super::ports::{NearbyPharmacyRequest, NearbyPharmacySource, NearbySourceError};
use super::{Coordinate, OperatingHours, Pharmacy, PharmacyKey};

mod handle;
mod runtime;

use handle::DiscoveryCommand;
pub use handle::{DiscoveryHandle, DiscoverySnapshot, DiscoveryStopped};
pub use runtime::{DiscoveryConfig, DiscoveryPorts};

/// Results handed back from background tasks.
#[derive(Debug)]
enum DiscoveryEvent {
    NearbyLoaded {
        cycle_id: Uuid,
        result: Result<Vec<Pharmacy>, NearbySourceError>,
    },
    HoursResolved {
        key: PharmacyKey,
        result: Result<OperatingHours, EnrichmentError>,
    },
}

/// Owns the pharmacy collection and drives the fetch/enrich pipeline.
pub struct DiscoveryController {
    nearby_source: Arc<dyn NearbyPharmacySource>,
    enricher: Arc<DetailEnricher>,
    clock: Arc<dyn Clock + Send + Sync>,
    config: DiscoveryConfig,
    collection: PharmacyCollection,
    tracker: LocationTracker,
    commands: mpsc::UnboundedReceiver<DiscoveryCommand>,
    fetch_triggers: mpsc::UnboundedReceiver<Coordinate>,
    events_tx: mpsc::UnboundedSender<DiscoveryEvent>,
    events: mpsc::UnboundedReceiver<DiscoveryEvent>,
    snapshots: watch::Sender<DiscoverySnapshot>,
    pending_tasks: usize,
    completed_fetches: u64,
}

impl DiscoveryController {
    /// Build a controller and the handle used to drive it.
    ///
    /// The controller does nothing until [`DiscoveryController::run`] is
    /// awaited, typically on a dedicated task.
    /// ```rust,ignore
    /// let (controller, handle) = DiscoveryController::new(ports, clock, config);
    /// tokio::spawn(controller.run());
    /// handle.camera_moved(Coordinate::new(37.5665, 126.978))?;
    /// ```
    pub fn new(
        ports: DiscoveryPorts,
        clock: Arc<dyn Clock + Send + Sync>,
        config: DiscoveryConfig,
    ) -> (Self, DiscoveryHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (fetch_tx, fetch_triggers) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(DiscoverySnapshot::default());

        let enricher = DetailEnricher::new(ports.detail_source, ports.geocoder)
            .with_rows(config.detail_rows);
        let tracker = LocationTracker::new(DebounceScheduler::new(config.debounce_window, fetch_tx));

        let controller = Self {
            nearby_source: ports.nearby_source,
            enricher: Arc::new(enricher),
            clock,
            config,
            collection: PharmacyCollection::new(),
            tracker,
            commands,
            fetch_triggers,
            events_tx,
            events,
            snapshots,
            pending_tasks: 0,
            completed_fetches: 0,
        };
        (controller, DiscoveryHandle::new(commands_tx, snapshots_rx))
    }

    /// Run the controller loop until shutdown or until every handle is gone.
    pub async fn run(mut self) {
        let period = self.config.status_refresh_interval.max(Duration::from_secs(1));
        let mut refresh = tokio::time::interval_at(Instant::now() + period, period);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(DiscoveryCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(coordinate) = self.fetch_triggers.recv() => {
                    self.dispatch_nearby_fetch(coordinate);
                }
                Some(event) = self.events.recv() => self.handle_event(event),
                _ = refresh.tick() => self.refresh_open_status(),
            }
        }

        self.tracker.cancel_pending();
        info!(
            pharmacies = self.collection.len(),
            pending_tasks = self.pending_tasks,
            "discovery controller stopped"
        );
    }

    fn handle_command(&mut self, command: DiscoveryCommand) {
        match command {
            DiscoveryCommand::DeviceLocated(coordinate) => self.tracker.device_located(coordinate),
            DiscoveryCommand::CameraMoved(coordinate) => self.tracker.camera_moved(coordinate),
            DiscoveryCommand::Recenter => {
                if !self.tracker.recenter() {
                    debug!("recenter requested before the first device fix");
                }
            }
            DiscoveryCommand::FetchNow(coordinate) => self.dispatch_nearby_fetch(coordinate),
            DiscoveryCommand::Shutdown => {}
        }
    }

    fn dispatch_nearby_fetch(&mut self, centre: Coordinate) {
        let cycle_id = Uuid::new_v4();
        let request =
            NearbyPharmacyRequest::around(centre).with_radius(self.config.search_radius_meters);
        debug!(
            %cycle_id,
            latitude = centre.latitude,
            longitude = centre.longitude,
            radius_meters = request.radius_meters,
            "dispatching nearby pharmacy fetch"
        );

        let source = Arc::clone(&self.nearby_source);
        let events = self.events_tx.clone();
        self.pending_tasks += 1;
        tokio::spawn(async move {
            let result = source.fetch_nearby(&request).await;
            if events
                .send(DiscoveryEvent::NearbyLoaded { cycle_id, result })
                .is_err()
            {
                debug!(%cycle_id, "controller stopped before nearby results arrived");
            }
        });
        self.publish();
    }

    fn dispatch_enrichment(&mut self, pharmacy: Pharmacy) {
        let enricher = Arc::clone(&self.enricher);
        let events = self.events_tx.clone();
        self.pending_tasks += 1;
        tokio::spawn(async move {
            let result = enricher.enrich(&pharmacy).await;
            let key = pharmacy.key();
            if events
                .send(DiscoveryEvent::HoursResolved { key, result })
                .is_err()
            {
                debug!(name = %pharmacy.name, "controller stopped before hours arrived");
            }
        });
    }

    fn handle_event(&mut self, event: DiscoveryEvent) {
        self.pending_tasks = self.pending_tasks.saturating_sub(1);
        match event {
            DiscoveryEvent::NearbyLoaded { cycle_id, result } => {
                self.completed_fetches += 1;
                self.merge_nearby(cycle_id, result);
            }
            DiscoveryEvent::HoursResolved { key, result } => self.merge_hours(&key, result),
        }
        self.publish();
    }

    fn merge_nearby(&mut self, cycle_id: Uuid, result: Result<Vec<Pharmacy>, NearbySourceError>) {
        let batch = match result {
            Ok(batch) => batch,
            Err(error) => {
                warn!(%cycle_id, %error, "nearby fetch failed; keeping current pharmacies");
                return;
            }
        };

        let fetched = batch.len();
        let added = self.collection.merge(batch);
        let targets = self.collection.claim_for_enrichment(&added);
        info!(
            %cycle_id,
            fetched,
            added = added.len(),
            enrichments = targets.len(),
            total = self.collection.len(),
            "merged nearby pharmacies"
        );
        for pharmacy in targets {
            self.dispatch_enrichment(pharmacy);
        }
    }

    fn merge_hours(&mut self, key: &PharmacyKey, result: Result<OperatingHours, EnrichmentError>) {
        match result {
            Ok(hours) => {
                let now = self.now();
                if self.collection.apply_hours(&key.name, hours, now) {
                    debug!(name = %key.name, "applied operating hours");
                } else {
                    debug!(name = %key.name, "enriched pharmacy is no longer listed");
                }
            }
            Err(error) => {
                warn!(
                    name = %key.name,
                    address = %key.address,
                    %error,
                    "enrichment failed; pharmacy stays without hours"
                );
            }
        }
    }

    fn refresh_open_status(&mut self) {
        let now = self.now();
        let changed = self.collection.refresh_open_status(now);
        if changed > 0 {
            debug!(changed, "open status changed");
            self.publish();
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.local().naive_local()
    }

    fn publish(&self) {
        self.snapshots.send_replace(DiscoverySnapshot {
            pharmacies: self.collection.entries().to_vec(),
            pending_tasks: self.pending_tasks,
            completed_fetches: self.completed_fetches,
        });
    }
}

#[cfg(test)]
mod tests;
