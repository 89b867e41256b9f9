#![allow(dead_code)]

use std::path::PathBuf;

use bevy_ecs::prelude::World;
use taxi_core::booking::{ActiveRide, HistoryPersistence, LifecycleConfig};
use taxi_core::clock::SimulationClock;
use taxi_core::drivers::{DriverDirectory, DriverPicker};
use taxi_core::history::{load_history_or_empty, RideHistory};
use taxi_core::notify::{NoopNotifier, NotifierResource, RecordingNotifier};
use taxi_core::telemetry::RideTelemetry;

/// Fixed epoch used by test worlds so epoch-anchored timestamps are exact.
pub const TEST_EPOCH_MS: u64 = 1_700_000_000_000;

/// Builder that populates a world with all booking resources used in
/// integration tests.
#[derive(Debug, Default)]
pub struct TestWorldBuilder {
    seed: Option<u64>,
    epoch_ms: Option<u64>,
    history_path: Option<PathBuf>,
    lifecycle: Option<LifecycleConfig>,
    recorder: Option<RecordingNotifier>,
}

impl TestWorldBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the RNG seed for driver picks (defaults to 42).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the clock epoch (defaults to [TEST_EPOCH_MS]).
    pub fn with_epoch_ms(mut self, epoch_ms: u64) -> Self {
        self.epoch_ms = Some(epoch_ms);
        self
    }

    /// Persist and preload ride history at this path. Without it, history
    /// stays in memory.
    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    /// Override lifecycle timer delays.
    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Capture order notifications with this recorder. Keep a clone to
    /// assert on the sent orders.
    pub fn with_recording_notifier(mut self, recorder: RecordingNotifier) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Build the world with the configured resources.
    pub fn build(self) -> World {
        let mut world = World::new();
        world.insert_resource(SimulationClock::with_epoch(
            self.epoch_ms.unwrap_or(TEST_EPOCH_MS),
        ));
        world.insert_resource(RideTelemetry::default());
        world.insert_resource(DriverDirectory::builtin());
        world.insert_resource(DriverPicker::new(Some(self.seed.unwrap_or(42))));
        world.insert_resource(self.lifecycle.unwrap_or_default());
        world.insert_resource(ActiveRide::default());

        let records = self
            .history_path
            .as_deref()
            .map(load_history_or_empty)
            .unwrap_or_default();
        world.insert_resource(RideHistory::from_records(records));
        world.insert_resource(HistoryPersistence {
            path: self.history_path,
        });

        match self.recorder {
            Some(recorder) => world.insert_resource(NotifierResource(Box::new(recorder))),
            None => world.insert_resource(NotifierResource(Box::new(NoopNotifier))),
        }
        world
    }
}
