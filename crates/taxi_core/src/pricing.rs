//! Fare and pickup ETA estimation for a prospective ride.

use crate::spatial::{distance_km_between_points, GeoPoint};
use crate::tariff::TariffTier;

/// Minimum pickup ETA quoted to the rider, in minutes.
pub const MIN_ETA_MINUTES: u32 = 5;

/// Assumed city driving pace: minutes per kilometre.
pub const ETA_MINUTES_PER_KM: f64 = 2.0;

/// A quote shown before the ride is requested. The fare is fixed at request
/// time from the quote the rider accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RideQuote {
    pub fare: f64,
    pub eta_minutes: u32,
}

/// Quote a ride for the given tier.
///
/// Formula: `fare = base_fare + (distance_km * per_km_rate)`,
/// `eta_minutes = max(MIN_ETA_MINUTES, round(distance_km * ETA_MINUTES_PER_KM))`.
pub fn estimate(pickup: GeoPoint, dropoff: GeoPoint, tier: TariffTier) -> RideQuote {
    let distance_km = distance_km_between_points(pickup, dropoff);
    let fare = tier.base_fare() + (distance_km * tier.per_km_rate());
    let eta_minutes = ((distance_km * ETA_MINUTES_PER_KM).round() as u32).max(MIN_ETA_MINUTES);
    RideQuote { fare, eta_minutes }
}
