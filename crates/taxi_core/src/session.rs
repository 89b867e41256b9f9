//! Session setup: wire every booking resource into a fresh world.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bevy_ecs::prelude::{Resource, World};
use tracing::{info, warn};

use crate::booking::{ActiveRide, HistoryPersistence, LifecycleConfig};
use crate::clock::SimulationClock;
use crate::drivers::{DriverDirectory, DriverPicker};
use crate::history::{history_file_path, load_history_or_empty, RideHistory};
use crate::notify::{build_notifier, NotifierKind, NotifierResource};
use crate::profile::{load_session, session_file_path, UserProfile};
use crate::telemetry::RideTelemetry;

/// The signed-in rider, if any. Loaded from the session file at build time.
#[derive(Debug, Default, Resource)]
pub struct SessionProfile(pub Option<UserProfile>);

/// Parameters for building a session.
#[derive(Debug, Clone, Default)]
pub struct SessionParams {
    /// Random seed for driver picks (optional; if None, uses entropy).
    pub seed: Option<u64>,
    /// Unix epoch ms anchoring sim time zero. Defaults to wall clock now.
    pub epoch_ms: Option<u64>,
    /// History file location. `None` resolves to `ride_history.json` in the
    /// current directory; persistence is skipped if even that fails.
    pub history_path: Option<PathBuf>,
    /// Session file location. `None` resolves to `session.json` in the
    /// current directory.
    pub session_path: Option<PathBuf>,
    pub notifier: NotifierKind,
    pub lifecycle: LifecycleConfig,
}

impl SessionParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_epoch_ms(mut self, epoch_ms: u64) -> Self {
        self.epoch_ms = Some(epoch_ms);
        self
    }

    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    pub fn with_notifier(mut self, notifier: NotifierKind) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

fn wall_clock_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

/// Populates `world` with the clock, driver directory, seeded picker,
/// lifecycle config, notifier, empty ride slot, and history preloaded from
/// disk. Caller must have already created `world`; this inserts resources
/// only.
pub fn build_session(world: &mut World, params: SessionParams) {
    let epoch_ms = params.epoch_ms.unwrap_or_else(wall_clock_epoch_ms);
    world.insert_resource(SimulationClock::with_epoch(epoch_ms));
    world.insert_resource(RideTelemetry::default());
    world.insert_resource(DriverDirectory::builtin());
    world.insert_resource(DriverPicker::new(params.seed));
    world.insert_resource(params.lifecycle);
    world.insert_resource(ActiveRide::default());
    world.insert_resource(NotifierResource(build_notifier(&params.notifier)));

    let history_path = params.history_path.or_else(|| match history_file_path() {
        Ok(path) => Some(path),
        Err(error) => {
            warn!(error = %error, "history persistence disabled");
            None
        }
    });
    let records = history_path
        .as_deref()
        .map(load_history_or_empty)
        .unwrap_or_default();
    let history_records = records.len();
    world.insert_resource(RideHistory::from_records(records));
    world.insert_resource(HistoryPersistence { path: history_path });

    let session_path = params.session_path.or_else(|| match session_file_path() {
        Ok(path) => Some(path),
        Err(error) => {
            warn!(error = %error, "session file disabled");
            None
        }
    });
    let profile = session_path.as_deref().and_then(load_session);
    let signed_in = profile.is_some();
    world.insert_resource(SessionProfile(profile));

    info!(
        seed = ?params.seed,
        epoch_ms,
        history_records,
        signed_in,
        "session built"
    );
}
