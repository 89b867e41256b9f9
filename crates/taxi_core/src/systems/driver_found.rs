//! DriverFound system: assign a driver to a searching ride when its timer fires.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};
use tracing::warn;

use crate::booking::LifecycleConfig;
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::drivers::{DriverDirectory, DriverPicker};
use crate::ecs::{AssignedDriver, Ride, RideStateCommands, RideStatus, Searching};
use crate::telemetry::RideTelemetry;

pub fn driver_found_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    config: Res<LifecycleConfig>,
    directory: Res<DriverDirectory>,
    mut picker: ResMut<DriverPicker>,
    mut telemetry: ResMut<RideTelemetry>,
    mut commands: Commands,
    rides: Query<(&Ride, Option<&Searching>)>,
) {
    if event.0.kind != EventKind::DriverFound {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok((ride, searching)) = rides.get(ride_entity) else {
        return;
    };
    if searching.is_none() {
        return;
    }

    let Some(driver) = picker.pick(&directory, ride.tier) else {
        warn!(ride = %ride.id, tier = %ride.tier, "no drivers available for tier");
        return;
    };
    let driver = driver.clone();

    commands
        .entity(ride_entity)
        .set_ride_state_driver_found()
        .insert(AssignedDriver(driver));

    telemetry.record(ride.id, RideStatus::DriverFound, clock.now());
    clock.schedule_in_secs(
        config.arrival_delay_secs,
        EventKind::DriverArriving,
        Some(EventSubject::Ride(ride_entity)),
    );
}
