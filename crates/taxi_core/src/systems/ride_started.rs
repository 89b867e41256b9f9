//! RideStarted system: the driver picked the rider up; the trip is underway.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{DriverArriving, Ride, RideStateCommands, RideStatus, RideTiming};
use crate::telemetry::RideTelemetry;

pub fn ride_started_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    mut telemetry: ResMut<RideTelemetry>,
    mut commands: Commands,
    mut rides: Query<(&Ride, &mut RideTiming, Option<&DriverArriving>)>,
) {
    if event.0.kind != EventKind::RideStarted {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok((ride, mut timing, arriving)) = rides.get_mut(ride_entity) else {
        return;
    };
    if arriving.is_none() {
        return;
    }

    timing.started_at = Some(clock.now());
    commands.entity(ride_entity).set_ride_state_in_progress();
    telemetry.record(ride.id, RideStatus::InProgress, clock.now());

    // Nothing further is scheduled: completion is the rider's call.
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Schedule;

    use crate::ecs::InProgress;
    use crate::tariff::TariffTier;
    use crate::test_helpers::{create_test_world, test_dropoff, test_pickup};
    use uuid::Uuid;

    #[test]
    fn stamps_start_time_and_moves_to_in_progress() {
        let mut world = create_test_world();
        let ride_entity = world
            .spawn((
                Ride {
                    id: Uuid::new_v4(),
                    requester_id: "rider-1".to_string(),
                    pickup_address: "Tverskaya 1".to_string(),
                    dropoff_address: "Arbat 10".to_string(),
                    pickup: test_pickup(),
                    dropoff: test_dropoff(),
                    tier: TariffTier::Economy,
                    fare: 69.14,
                },
                RideTiming {
                    requested_at: 0,
                    started_at: None,
                    completed_at: None,
                },
                DriverArriving,
            ))
            .id();

        world.resource_mut::<SimulationClock>().schedule_at_secs(
            11,
            EventKind::RideStarted,
            Some(EventSubject::Ride(ride_entity)),
        );
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("ride started event");
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(ride_started_system);
        schedule.run(&mut world);

        assert!(world.entity(ride_entity).contains::<InProgress>());
        let timing = world.get::<RideTiming>(ride_entity).expect("timing");
        assert_eq!(timing.started_at, Some(11 * crate::clock::ONE_SEC_MS));
        assert!(world.resource::<SimulationClock>().is_empty());
    }
}
