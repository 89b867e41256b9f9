#![allow(dead_code)]

use taxi_core::booking::RideRequest;
use taxi_core::pricing;
use taxi_core::profile::UserProfile;
use taxi_core::spatial::GeoPoint;
use taxi_core::tariff::TariffTier;
use taxi_core::test_helpers::{test_dropoff, test_pickup, test_profile};

/// Builder for ride request fixtures using the demo rider and geography.
#[derive(Debug, Clone)]
pub struct RideRequestBuilder {
    requester: UserProfile,
    pickup_address: String,
    dropoff_address: String,
    pickup: GeoPoint,
    dropoff: GeoPoint,
    tier: TariffTier,
    fare: Option<f64>,
}

impl Default for RideRequestBuilder {
    fn default() -> Self {
        Self {
            requester: test_profile(),
            pickup_address: "Tverskaya 1".to_string(),
            dropoff_address: "Arbat 10".to_string(),
            pickup: test_pickup(),
            dropoff: test_dropoff(),
            tier: TariffTier::Economy,
            fare: None,
        }
    }
}

impl RideRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tier(mut self, tier: TariffTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_requester(mut self, requester: UserProfile) -> Self {
        self.requester = requester;
        self
    }

    pub fn with_route(mut self, pickup: GeoPoint, dropoff: GeoPoint) -> Self {
        self.pickup = pickup;
        self.dropoff = dropoff;
        self
    }

    pub fn with_addresses(mut self, pickup: &str, dropoff: &str) -> Self {
        self.pickup_address = pickup.to_string();
        self.dropoff_address = dropoff.to_string();
        self
    }

    /// Override the fare; without this the builder quotes the route.
    pub fn with_fare(mut self, fare: f64) -> Self {
        self.fare = Some(fare);
        self
    }

    pub fn build(self) -> RideRequest {
        let fare = self
            .fare
            .unwrap_or_else(|| pricing::estimate(self.pickup, self.dropoff, self.tier).fare);
        RideRequest {
            requester: self.requester,
            pickup_address: self.pickup_address,
            dropoff_address: self.dropoff_address,
            pickup: self.pickup,
            dropoff: self.dropoff,
            tier: self.tier,
            fare,
        }
    }
}
