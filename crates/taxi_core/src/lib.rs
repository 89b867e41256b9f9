pub mod booking;
pub mod clock;
pub mod drivers;
pub mod ecs;
pub mod history;
pub mod notify;
pub mod pricing;
pub mod profile;
pub mod runner;
pub mod session;
pub mod spatial;
pub mod systems;
pub mod tariff;
pub mod telemetry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
