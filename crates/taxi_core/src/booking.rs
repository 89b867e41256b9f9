//! Booking operations: the entry points a UI calls on the ride world.
//!
//! All operations take `&mut World` directly. Timer-driven transitions run
//! through the event schedule instead; these functions only start, steer,
//! or finish the single active ride.

use std::fmt;
use std::path::PathBuf;

use bevy_ecs::prelude::{Entity, Resource, World};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::drivers::{Driver, DriverDirectory};
use crate::ecs::{
    live_status, AssignedDriver, CandidateDrivers, Ride, RideStateCommands, RideStatus,
    RideTiming, Searching,
};
use crate::history::{save_history, RideHistory, RideRecord};
use crate::notify::{NotifierResource, OrderSummary};
use crate::profile::UserProfile;
use crate::spatial::GeoPoint;
use crate::tariff::TariffTier;
use crate::telemetry::RideTelemetry;

/// Handle to the single ride a session may have live at a time.
#[derive(Debug, Default, Resource)]
pub struct ActiveRide {
    pub entity: Option<Entity>,
}

/// Timer delays (seconds) between lifecycle stages.
#[derive(Debug, Clone, Copy, Resource)]
pub struct LifecycleConfig {
    pub search_delay_secs: u64,
    pub arrival_delay_secs: u64,
    pub pickup_delay_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            search_delay_secs: 3,
            arrival_delay_secs: 5,
            pickup_delay_secs: 3,
        }
    }
}

/// Where finished rides get persisted. `None` keeps history in memory only.
#[derive(Debug, Clone, Default, Resource)]
pub struct HistoryPersistence {
    pub path: Option<PathBuf>,
}

/// An accepted quote, ready to become a ride. `fare` is the quoted fare the
/// rider agreed to; it does not change for the life of the ride.
#[derive(Debug, Clone)]
pub struct RideRequest {
    pub requester: UserProfile,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub tier: TariffTier,
    pub fare: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRideError {
    RideAlreadyActive,
}

impl fmt::Display for RequestRideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestRideError::RideAlreadyActive => {
                write!(f, "a ride is already active; complete or cancel it first")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarSelectionOutcome {
    Selected,
    /// No candidate car with that model.
    UnknownModel,
    /// No active business ride waiting for a car choice.
    NotSelectable,
}

/// Read-only view of the active ride for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RideSnapshot {
    pub id: Uuid,
    pub status: RideStatus,
    pub tier: TariffTier,
    pub fare: f64,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub driver: Option<Driver>,
}

/// Accept a quote and start the lifecycle. Economy and comfort rides get
/// their search timer immediately; business rides stay `Searching` until
/// [`select_car_and_driver`] picks a car.
pub fn request_ride(world: &mut World, request: RideRequest) -> Result<Uuid, RequestRideError> {
    if let Some(active) = world.resource::<ActiveRide>().entity {
        if world.get_entity(active).is_some() {
            return Err(RequestRideError::RideAlreadyActive);
        }
    }

    let ride_id = Uuid::new_v4();
    let now = world.resource::<SimulationClock>().now();
    let candidates = world
        .resource::<DriverDirectory>()
        .drivers_for_tier(request.tier)
        .to_vec();

    let order = OrderSummary {
        ride_id,
        requester_name: request.requester.name.clone(),
        requester_phone: request.requester.phone.clone(),
        pickup_address: request.pickup_address.clone(),
        dropoff_address: request.dropoff_address.clone(),
        tier: request.tier,
        fare: request.fare,
    };

    let tier = request.tier;
    let entity = world
        .spawn((
            Ride {
                id: ride_id,
                requester_id: request.requester.id,
                pickup_address: request.pickup_address,
                dropoff_address: request.dropoff_address,
                pickup: request.pickup,
                dropoff: request.dropoff,
                tier,
                fare: request.fare,
            },
            RideTiming {
                requested_at: now,
                started_at: None,
                completed_at: None,
            },
            CandidateDrivers(candidates),
            Searching,
        ))
        .id();

    world.resource_mut::<ActiveRide>().entity = Some(entity);
    world
        .resource_mut::<RideTelemetry>()
        .record(ride_id, RideStatus::Searching, now);

    // Best effort; delivery failures never fail the request.
    world.resource::<NotifierResource>().0.notify_order(&order);

    if tier != TariffTier::Business {
        let delay = world.resource::<LifecycleConfig>().search_delay_secs;
        world.resource_mut::<SimulationClock>().schedule_in_secs(
            delay,
            EventKind::DriverFound,
            Some(EventSubject::Ride(entity)),
        );
    }

    info!(ride = %ride_id, %tier, "ride requested");
    Ok(ride_id)
}

/// Pick the car for a business ride that is still searching. Assigns the
/// candidate driver with that exact car model and resumes the timer chain.
pub fn select_car_and_driver(world: &mut World, car_model: &str) -> CarSelectionOutcome {
    let Some(entity) = world.resource::<ActiveRide>().entity else {
        return CarSelectionOutcome::NotSelectable;
    };
    let Some(entity_ref) = world.get_entity(entity) else {
        return CarSelectionOutcome::NotSelectable;
    };
    if !entity_ref.contains::<Searching>() {
        return CarSelectionOutcome::NotSelectable;
    }
    let Some(ride) = entity_ref.get::<Ride>() else {
        return CarSelectionOutcome::NotSelectable;
    };
    if ride.tier != TariffTier::Business {
        return CarSelectionOutcome::NotSelectable;
    }
    let ride_id = ride.id;
    let Some(candidates) = entity_ref.get::<CandidateDrivers>() else {
        return CarSelectionOutcome::NotSelectable;
    };
    let Some(driver) = candidates
        .0
        .iter()
        .find(|driver| driver.car_model == car_model)
        .cloned()
    else {
        return CarSelectionOutcome::UnknownModel;
    };

    world
        .entity_mut(entity)
        .set_ride_state_driver_found()
        .insert(AssignedDriver(driver.clone()));

    let now = world.resource::<SimulationClock>().now();
    world
        .resource_mut::<RideTelemetry>()
        .record(ride_id, RideStatus::DriverFound, now);

    let delay = world.resource::<LifecycleConfig>().arrival_delay_secs;
    world.resource_mut::<SimulationClock>().schedule_in_secs(
        delay,
        EventKind::DriverArriving,
        Some(EventSubject::Ride(entity)),
    );

    info!(ride = %ride_id, driver = %driver.name, car = %driver.car_model, "car selected");
    CarSelectionOutcome::Selected
}

/// Finish the ride in progress. `None` when there is no active ride or it
/// has not started yet.
pub fn complete_ride(world: &mut World) -> Option<RideRecord> {
    let entity = world.resource::<ActiveRide>().entity?;
    let entity_ref = world.get_entity(entity)?;
    if live_status(entity_ref) != Some(RideStatus::InProgress) {
        return None;
    }

    let now = world.resource::<SimulationClock>().now();
    if let Some(mut timing) = world.entity_mut(entity).get_mut::<RideTiming>() {
        timing.completed_at = Some(now);
    }

    let record = ride_record_from_entity(world, entity, RideStatus::Completed)?;
    info!(ride = %record.id, fare = record.fare, "ride completed");
    close_ride(world, entity, record)
}

/// Cancel the active ride from any non-terminal stage. The record keeps
/// whatever driver details were assigned by then.
pub fn cancel_ride(world: &mut World) -> Option<RideRecord> {
    let entity = world.resource::<ActiveRide>().entity?;
    let entity_ref = world.get_entity(entity)?;
    let stage = live_status(entity_ref)?;

    let record = ride_record_from_entity(world, entity, RideStatus::Cancelled)?;
    info!(ride = %record.id, ?stage, "ride cancelled");
    close_ride(world, entity, record)
}

/// Snapshot of the active ride, if any.
pub fn current_ride_snapshot(world: &World) -> Option<RideSnapshot> {
    let entity = world.resource::<ActiveRide>().entity?;
    let entity_ref = world.get_entity(entity)?;
    let ride = entity_ref.get::<Ride>()?;
    let status = live_status(entity_ref)?;

    Some(RideSnapshot {
        id: ride.id,
        status,
        tier: ride.tier,
        fare: ride.fare,
        pickup_address: ride.pickup_address.clone(),
        dropoff_address: ride.dropoff_address.clone(),
        driver: entity_ref
            .get::<AssignedDriver>()
            .map(|assigned| assigned.0.clone()),
    })
}

fn ride_record_from_entity(
    world: &World,
    entity: Entity,
    status: RideStatus,
) -> Option<RideRecord> {
    let entity_ref = world.get_entity(entity)?;
    let ride = entity_ref.get::<Ride>()?;
    let timing = entity_ref.get::<RideTiming>()?;
    let clock = world.resource::<SimulationClock>();

    let mut record = RideRecord {
        id: ride.id,
        requester_id: ride.requester_id.clone(),
        pickup_address: ride.pickup_address.clone(),
        dropoff_address: ride.dropoff_address.clone(),
        pickup: ride.pickup,
        dropoff: ride.dropoff,
        tier: ride.tier,
        status,
        fare: ride.fare,
        driver_id: None,
        driver_name: None,
        driver_phone: None,
        driver_car_model: None,
        driver_car_plate: None,
        requested_at_ms: clock.sim_to_real_ms(timing.requested_at),
        started_at_ms: timing.started_at.map(|at| clock.sim_to_real_ms(at)),
        completed_at_ms: timing.completed_at.map(|at| clock.sim_to_real_ms(at)),
    };
    if let Some(assigned) = entity_ref.get::<AssignedDriver>() {
        record = record.with_driver(&assigned.0);
    }
    Some(record)
}

/// Append to history (newest first), persist if configured, free the slot,
/// and despawn. Timers still pending for this ride become no-ops because
/// the entity is gone.
fn close_ride(world: &mut World, entity: Entity, record: RideRecord) -> Option<RideRecord> {
    let now = world.resource::<SimulationClock>().now();
    world
        .resource_mut::<RideTelemetry>()
        .record(record.id, record.status, now);
    world.resource_mut::<RideHistory>().append(record.clone());
    persist_history(world);
    world.resource_mut::<ActiveRide>().entity = None;
    world.despawn(entity);
    Some(record)
}

pub(crate) fn persist_history(world: &World) {
    let Some(path) = world.resource::<HistoryPersistence>().path.as_ref() else {
        return;
    };
    let history = world.resource::<RideHistory>();
    if let Err(error) = save_history(path, history.records()) {
        warn!(error = %error, "failed to persist ride history");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_world, test_dropoff, test_pickup, test_profile};

    fn economy_request() -> RideRequest {
        let quote = crate::pricing::estimate(test_pickup(), test_dropoff(), TariffTier::Economy);
        RideRequest {
            requester: test_profile(),
            pickup_address: "Tverskaya 1".to_string(),
            dropoff_address: "Arbat 10".to_string(),
            pickup: test_pickup(),
            dropoff: test_dropoff(),
            tier: TariffTier::Economy,
            fare: quote.fare,
        }
    }

    #[test]
    fn request_ride_spawns_searching_ride_and_schedules_search_timer() {
        let mut world = create_test_world();

        let ride_id = request_ride(&mut world, economy_request()).expect("request");

        let snapshot = current_ride_snapshot(&world).expect("snapshot");
        assert_eq!(snapshot.id, ride_id);
        assert_eq!(snapshot.status, RideStatus::Searching);
        assert_eq!(snapshot.driver, None);

        let mut clock = world.resource_mut::<SimulationClock>();
        let event = clock.pop_next().expect("search timer");
        assert_eq!(event.kind, EventKind::DriverFound);
        assert_eq!(event.timestamp, 3 * crate::clock::ONE_SEC_MS);
    }

    #[test]
    fn second_request_is_rejected_while_a_ride_is_active() {
        let mut world = create_test_world();

        request_ride(&mut world, economy_request()).expect("first request");
        let second = request_ride(&mut world, economy_request());

        assert_eq!(second, Err(RequestRideError::RideAlreadyActive));
    }

    #[test]
    fn business_request_waits_for_car_selection() {
        let mut world = create_test_world();
        let mut request = economy_request();
        request.tier = TariffTier::Business;

        request_ride(&mut world, request).expect("request");

        assert_eq!(
            current_ride_snapshot(&world).expect("snapshot").status,
            RideStatus::Searching
        );
        assert!(world.resource::<SimulationClock>().is_empty());
    }

    #[test]
    fn car_selection_requires_a_business_ride() {
        let mut world = create_test_world();
        request_ride(&mut world, economy_request()).expect("request");

        let outcome = select_car_and_driver(&mut world, "Maybach S-Class");
        assert_eq!(outcome, CarSelectionOutcome::NotSelectable);
    }

    #[test]
    fn complete_before_pickup_is_a_no_op() {
        let mut world = create_test_world();
        request_ride(&mut world, economy_request()).expect("request");

        assert_eq!(complete_ride(&mut world), None);
        assert!(current_ride_snapshot(&world).is_some());
    }

    #[test]
    fn cancel_without_a_ride_returns_none() {
        let mut world = create_test_world();
        assert_eq!(cancel_ride(&mut world), None);
    }
}
