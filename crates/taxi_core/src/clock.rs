use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

/// Milliseconds per simulated second.
pub const ONE_SEC_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    DriverFound,
    DriverArriving,
    RideStarted,
}

/// Entity an event addresses. Rides are generational [Entity] values, so an
/// event whose ride has since been despawned resolves to nothing and the
/// handling system becomes a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSubject {
    Ride(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed. Inserted by the runner before each
/// schedule run; systems gate on its kind and subject.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    epoch_ms: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    /// Clock whose simulation origin maps to the given wall-clock unix epoch (ms).
    pub fn with_epoch(epoch_ms: u64) -> Self {
        Self {
            epoch_ms,
            ..Default::default()
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn epoch_ms(&self) -> u64 {
        self.epoch_ms
    }

    /// Convert a simulation timestamp to wall-clock unix ms.
    pub fn sim_to_real_ms(&self, sim_ms: u64) -> u64 {
        self.epoch_ms.saturating_add(sim_ms)
    }

    /// Convert a wall-clock unix ms to a simulation timestamp.
    pub fn real_to_sim_ms(&self, real_ms: u64) -> u64 {
        real_ms.saturating_sub(self.epoch_ms)
    }

    pub fn schedule(&mut self, event: Event) {
        debug_assert!(
            event.timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        self.events.push(event);
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule(Event {
            timestamp,
            kind,
            subject,
        });
    }

    pub fn schedule_at_secs(&mut self, secs: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(secs * ONE_SEC_MS, kind, subject);
    }

    /// Schedule an event `secs` seconds after the current time.
    pub fn schedule_in_secs(&mut self, secs: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now + secs * ONE_SEC_MS, kind, subject);
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::RideStarted, None);
        clock.schedule_at(5, EventKind::DriverFound, None);
        clock.schedule_at(20, EventKind::DriverArriving, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(first.kind, EventKind::DriverFound);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn schedule_in_secs_offsets_from_current_time() {
        let mut clock = SimulationClock::default();
        clock.schedule_at_secs(3, EventKind::DriverFound, None);
        clock.pop_next().expect("advance to 3s");
        assert_eq!(clock.now(), 3 * ONE_SEC_MS);

        clock.schedule_in_secs(5, EventKind::DriverArriving, None);
        assert_eq!(clock.next_event_time(), Some(8 * ONE_SEC_MS));
        assert_eq!(clock.pending_event_count(), 1);
    }

    #[test]
    fn epoch_conversion_round_trips() {
        let clock = SimulationClock::with_epoch(1_700_000_000_000);
        let real = clock.sim_to_real_ms(12 * ONE_SEC_MS);
        assert_eq!(real, 1_700_000_012_000);
        assert_eq!(clock.real_to_sim_ms(real), 12 * ONE_SEC_MS);
    }
}
