use bevy_ecs::prelude::Resource;
use uuid::Uuid;

use crate::ecs::RideStatus;

/// One recorded lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusChange {
    pub ride_id: Uuid,
    pub status: RideStatus,
    pub at_ms: u64,
}

/// Rolling record of lifecycle transitions for the session.
#[derive(Debug, Default, Resource)]
pub struct RideTelemetry {
    pub transitions: Vec<StatusChange>,
    pub rides_completed: u64,
    pub rides_cancelled: u64,
}

impl RideTelemetry {
    pub fn record(&mut self, ride_id: Uuid, status: RideStatus, at_ms: u64) {
        self.transitions.push(StatusChange {
            ride_id,
            status,
            at_ms,
        });
        match status {
            RideStatus::Completed => self.rides_completed += 1,
            RideStatus::Cancelled => self.rides_cancelled += 1,
            _ => {}
        }
    }

    /// Transitions recorded for one ride, in the order they happened.
    pub fn transitions_for(&self, ride_id: Uuid) -> Vec<StatusChange> {
        self.transitions
            .iter()
            .copied()
            .filter(|change| change.ride_id == ride_id)
            .collect()
    }
}
