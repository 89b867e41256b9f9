pub mod driver_arriving;
pub mod driver_found;
pub mod ride_started;
