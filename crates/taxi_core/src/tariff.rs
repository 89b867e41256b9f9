//! Tariff tiers and their fixed rates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Service tier a ride is ordered under. Rates are fixed per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffTier {
    Economy,
    Comfort,
    Business,
}

impl TariffTier {
    pub const ALL: [TariffTier; 3] = [
        TariffTier::Economy,
        TariffTier::Comfort,
        TariffTier::Business,
    ];

    /// Fixed component of the fare, in currency units.
    pub fn base_fare(self) -> f64 {
        match self {
            TariffTier::Economy => 50.0,
            TariffTier::Comfort => 80.0,
            TariffTier::Business => 120.0,
        }
    }

    /// Per-kilometre component of the fare.
    pub fn per_km_rate(self) -> f64 {
        match self {
            TariffTier::Economy => 15.0,
            TariffTier::Comfort => 25.0,
            TariffTier::Business => 40.0,
        }
    }
}

impl fmt::Display for TariffTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TariffTier::Economy => "Economy",
            TariffTier::Comfort => "Comfort",
            TariffTier::Business => "Business",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_increase_with_tier() {
        assert!(TariffTier::Economy.base_fare() < TariffTier::Comfort.base_fare());
        assert!(TariffTier::Comfort.base_fare() < TariffTier::Business.base_fare());
        assert!(TariffTier::Economy.per_km_rate() < TariffTier::Comfort.per_km_rate());
        assert!(TariffTier::Comfort.per_km_rate() < TariffTier::Business.per_km_rate());
    }

    #[test]
    fn serializes_to_stable_identifiers() {
        let json = serde_json::to_string(&TariffTier::Economy).expect("serialize");
        assert_eq!(json, "\"economy\"");
        let tier: TariffTier = serde_json::from_str("\"business\"").expect("deserialize");
        assert_eq!(tier, TariffTier::Business);
    }
}
