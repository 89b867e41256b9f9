//! DriverArriving system: the assigned driver reports they are on the way.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::booking::LifecycleConfig;
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{DriverFound, Ride, RideStateCommands, RideStatus};
use crate::telemetry::RideTelemetry;

pub fn driver_arriving_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    config: Res<LifecycleConfig>,
    mut telemetry: ResMut<RideTelemetry>,
    mut commands: Commands,
    rides: Query<(&Ride, Option<&DriverFound>)>,
) {
    if event.0.kind != EventKind::DriverArriving {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok((ride, driver_found)) = rides.get(ride_entity) else {
        return;
    };
    if driver_found.is_none() {
        return;
    }

    commands.entity(ride_entity).set_ride_state_driver_arriving();

    telemetry.record(ride.id, RideStatus::DriverArriving, clock.now());
    clock.schedule_in_secs(
        config.pickup_delay_secs,
        EventKind::RideStarted,
        Some(EventSubject::Ride(ride_entity)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Schedule;

    use crate::ecs::{DriverArriving, RideTiming, Searching};
    use crate::tariff::TariffTier;
    use crate::test_helpers::{create_test_world, test_dropoff, test_pickup};
    use uuid::Uuid;

    fn sample_ride() -> (Ride, RideTiming) {
        (
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
        )
    }

    #[test]
    fn advances_to_arriving_and_schedules_pickup() {
        let mut world = create_test_world();
        let (ride, timing) = sample_ride();
        let ride_entity = world.spawn((ride, timing, DriverFound)).id();

        world.resource_mut::<SimulationClock>().schedule_at_secs(
            8,
            EventKind::DriverArriving,
            Some(EventSubject::Ride(ride_entity)),
        );
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("arriving event");
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(driver_arriving_system);
        schedule.run(&mut world);

        assert!(world.entity(ride_entity).contains::<DriverArriving>());
        assert!(!world.entity(ride_entity).contains::<DriverFound>());

        let next = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("pickup event");
        assert_eq!(next.kind, EventKind::RideStarted);
        assert_eq!(next.timestamp, 11 * crate::clock::ONE_SEC_MS);
    }

    #[test]
    fn ride_not_in_driver_found_stage_is_left_alone() {
        let mut world = create_test_world();
        let (ride, timing) = sample_ride();
        let ride_entity = world.spawn((ride, timing, Searching)).id();

        world.resource_mut::<SimulationClock>().schedule_at_secs(
            8,
            EventKind::DriverArriving,
            Some(EventSubject::Ride(ride_entity)),
        );
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("arriving event");
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(driver_arriving_system);
        schedule.run(&mut world);

        assert!(world.entity(ride_entity).contains::<Searching>());
        assert!(world.resource::<SimulationClock>().is_empty());
    }
}
