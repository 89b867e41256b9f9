use bevy_ecs::prelude::Component;
use bevy_ecs::system::EntityCommands;
use bevy_ecs::world::{EntityRef, EntityWorldMut};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::drivers::Driver;
use crate::spatial::GeoPoint;
use crate::tariff::TariffTier;

/// Lifecycle status of a ride. Derived ordering follows the lifecycle:
/// a live ride's recorded statuses are strictly increasing, except that
/// Cancelled may follow any non-terminal status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Searching,
    DriverFound,
    DriverArriving,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }
}

/// The accepted ride request; immutable for the ride's lifetime.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Ride {
    pub id: Uuid,
    pub requester_id: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub tier: TariffTier,
    /// Fixed at request time from the accepted quote.
    pub fare: f64,
}

/// Simulation timestamps (ms) for lifecycle milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct RideTiming {
    pub requested_at: u64,
    /// Set when the ride transitions to InProgress.
    pub started_at: Option<u64>,
    /// Set on completion; stays `None` when the ride is cancelled.
    pub completed_at: Option<u64>,
}

/// The driver assigned to the ride, copied from the directory on assignment.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct AssignedDriver(pub Driver);

/// Tier roster snapshot taken at request time; car selection for business
/// rides chooses from this list.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct CandidateDrivers(pub Vec<Driver>);

// Live-state markers. Exactly one is present on a live ride; terminal
// statuses exist only on history records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Searching;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct DriverFound;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct DriverArriving;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct InProgress;

/// Status of a live ride derived from its marker component.
pub fn live_status(entity: EntityRef<'_>) -> Option<RideStatus> {
    if entity.contains::<Searching>() {
        Some(RideStatus::Searching)
    } else if entity.contains::<DriverFound>() {
        Some(RideStatus::DriverFound)
    } else if entity.contains::<DriverArriving>() {
        Some(RideStatus::DriverArriving)
    } else if entity.contains::<InProgress>() {
        Some(RideStatus::InProgress)
    } else {
        None
    }
}

/// Commands extension for swapping a ride's live-state marker.
pub trait RideStateCommands {
    fn set_ride_state_searching(&mut self) -> &mut Self;
    fn set_ride_state_driver_found(&mut self) -> &mut Self;
    fn set_ride_state_driver_arriving(&mut self) -> &mut Self;
    fn set_ride_state_in_progress(&mut self) -> &mut Self;
}

impl RideStateCommands for EntityCommands<'_> {
    fn set_ride_state_searching(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(Searching)
    }

    fn set_ride_state_driver_found(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(DriverFound)
    }

    fn set_ride_state_driver_arriving(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(DriverArriving)
    }

    fn set_ride_state_in_progress(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(InProgress)
    }
}

// Same swaps for direct world access, used by the booking operations.
impl RideStateCommands for EntityWorldMut<'_> {
    fn set_ride_state_searching(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(Searching)
    }

    fn set_ride_state_driver_found(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(DriverFound)
    }

    fn set_ride_state_driver_arriving(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(DriverArriving)
    }

    fn set_ride_state_in_progress(&mut self) -> &mut Self {
        self.remove::<(Searching, DriverFound, DriverArriving, InProgress)>()
            .insert(InProgress)
    }
}
