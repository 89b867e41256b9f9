//! Event runner: advances the clock and routes timer events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};
use tracing::debug;

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::systems::{
    driver_arriving::driver_arriving_system, driver_found::driver_found_system,
    ride_started::ride_started_system,
};

// Condition functions for each event kind
fn is_driver_found(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DriverFound)
        .unwrap_or(false)
}

fn is_driver_arriving(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DriverArriving)
        .unwrap_or(false)
}

fn is_ride_started(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideStarted)
        .unwrap_or(false)
}

/// Runs one step: pops the next event, inserts it as [CurrentEvent], then
/// runs the schedule. Returns `false` when the clock has nothing pending.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(event) => event,
        None => return false,
    };
    debug!(timestamp = event.timestamp, kind = ?event.kind, "event popped");
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs one step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(event) => event,
        None => return false,
    };
    debug!(timestamp = event.timestamp, kind = ?event.kind, "event popped");
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs steps until empty and invokes `hook` after each step.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event_with_hook(world, schedule, &mut hook) {
        steps += 1;
    }
    steps
}

/// Builds the booking schedule: the three timer systems plus [apply_deferred]
/// so marker swaps land before the next step.
///
/// Systems are conditionally executed based on event type to reduce overhead.
pub fn booking_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        // DriverFound
        driver_found_system.run_if(is_driver_found),
        // DriverArriving
        driver_arriving_system.run_if(is_driver_arriving),
        // RideStarted
        ride_started_system.run_if(is_ride_started),
        // Always run apply_deferred so marker swaps are visible next step
        apply_deferred,
    ));

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_world;

    #[test]
    fn run_next_event_reports_an_empty_clock() {
        let mut world = create_test_world();
        let mut schedule = booking_schedule();

        assert!(!run_next_event(&mut world, &mut schedule));
    }

    #[test]
    fn hook_sees_each_event_in_time_order() {
        let mut world = create_test_world();
        {
            let mut clock = world.resource_mut::<SimulationClock>();
            clock.schedule_at_secs(5, EventKind::DriverArriving, None);
            clock.schedule_at_secs(2, EventKind::DriverFound, None);
        }

        let mut seen = Vec::new();
        let mut schedule = booking_schedule();
        let steps = run_until_empty_with_hook(&mut world, &mut schedule, 10, |_, event| {
            seen.push((event.timestamp, event.kind));
        });

        assert_eq!(steps, 2);
        assert_eq!(
            seen,
            vec![
                (2_000, EventKind::DriverFound),
                (5_000, EventKind::DriverArriving),
            ]
        );
    }
}
