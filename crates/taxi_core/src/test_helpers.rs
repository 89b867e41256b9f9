//! Test helpers for common test setup and utilities.
//!
//! This module provides shared fixtures to reduce duplication across test
//! files. Available under the `test-helpers` feature (on by default).

use bevy_ecs::prelude::World;

use crate::profile::UserProfile;
use crate::spatial::GeoPoint;

/// Standard pickup point used across test files: central Moscow.
pub fn test_pickup() -> GeoPoint {
    GeoPoint::new(55.7558, 37.6173)
}

/// Standard dropoff roughly 1.3 km from [test_pickup].
pub fn test_dropoff() -> GeoPoint {
    GeoPoint::new(55.7658, 37.6273)
}

/// A dropoff far enough out to exercise long-trip fares and ETAs.
pub fn test_distant_dropoff() -> GeoPoint {
    GeoPoint::new(55.84, 37.62)
}

/// The demo rider used across test files.
pub fn test_profile() -> UserProfile {
    UserProfile {
        id: "rider-test".to_string(),
        name: "Ivan Ivanov".to_string(),
        phone: "+7 (916) 123-45-67".to_string(),
        email: Some("ivan@example.com".to_string()),
    }
}

/// Create a test world with every booking resource.
///
/// The driver picker is seeded and history persistence is off, so tests are
/// deterministic and touch no files. For a fully wired session use
/// [crate::session::build_session].
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(crate::clock::SimulationClock::default());
    world.insert_resource(crate::telemetry::RideTelemetry::default());
    world.insert_resource(crate::drivers::DriverDirectory::builtin());
    world.insert_resource(crate::drivers::DriverPicker::new(Some(7)));
    world.insert_resource(crate::booking::LifecycleConfig::default());
    world.insert_resource(crate::booking::ActiveRide::default());
    world.insert_resource(crate::booking::HistoryPersistence::default());
    world.insert_resource(crate::history::RideHistory::default());
    world.insert_resource(crate::notify::NotifierResource(Box::new(
        crate::notify::NoopNotifier,
    )));
    world
}
