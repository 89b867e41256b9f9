//! Static driver directory, organised per tariff tier.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::spatial::GeoPoint;
use crate::tariff::TariffTier;

/// A driver as listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub car_model: String,
    pub car_plate: String,
    pub rating: f64,
    pub location: GeoPoint,
}

fn driver(
    id: &str,
    name: &str,
    phone: &str,
    car_model: &str,
    car_plate: &str,
    rating: f64,
) -> Driver {
    Driver {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        car_model: car_model.to_string(),
        car_plate: car_plate.to_string(),
        rating,
        // Every demo driver is stationed at Moscow centre.
        location: GeoPoint::new(55.7558, 37.6173),
    }
}

/// Fixed roster of drivers per tier. Order within a tier is the directory
/// order and never changes at runtime.
#[derive(Debug, Clone, Resource)]
pub struct DriverDirectory {
    economy: Vec<Driver>,
    comfort: Vec<Driver>,
    business: Vec<Driver>,
}

impl DriverDirectory {
    pub fn new(economy: Vec<Driver>, comfort: Vec<Driver>, business: Vec<Driver>) -> Self {
        Self {
            economy,
            comfort,
            business,
        }
    }

    /// The built-in demo roster: four drivers per tier.
    pub fn builtin() -> Self {
        Self::new(
            vec![
                driver("1", "Ivan Smirnov", "+7 (999) 111-22-33", "Renault Logan", "A123BV777", 4.8),
                driver("2", "Petr Ivanov", "+7 (999) 222-33-44", "Lada Granta", "B456GD888", 4.6),
                driver("3", "Sergey Petrov", "+7 (999) 333-44-55", "Hyundai Solaris", "C789EZ999", 4.9),
                driver("4", "Alexey Kozlov", "+7 (999) 444-55-66", "Kia Rio", "D012ZH000", 4.7),
            ],
            vec![
                driver("5", "Dmitry Volkov", "+7 (999) 555-66-77", "Haval Jolion", "E345ZI111", 4.9),
                driver("6", "Andrey Sokolov", "+7 (999) 666-77-88", "Kaiyi E5", "F678IK222", 4.8),
                driver("7", "Maxim Lebedev", "+7 (999) 777-88-99", "Toyota Camry", "K901LM333", 5.0),
                driver("8", "Nikolay Novikov", "+7 (999) 888-99-00", "Skoda Octavia", "L234MN444", 4.7),
            ],
            vec![
                driver("9", "Vladimir Orlov", "+7 (999) 999-00-11", "Maybach S-Class", "M567NO555", 5.0),
                driver("10", "Alexander Morozov", "+7 (999) 000-11-22", "BMW F90 M5", "N890OP666", 5.0),
                driver("11", "Roman Pavlov", "+7 (999) 111-22-33", "Mercedes S-Class", "O123PR777", 4.9),
                driver("12", "Igor Semenov", "+7 (999) 222-33-44", "Audi A8", "P456RS888", 4.8),
            ],
        )
    }

    /// Drivers available for a tier, in directory order.
    pub fn drivers_for_tier(&self, tier: TariffTier) -> &[Driver] {
        match tier {
            TariffTier::Economy => &self.economy,
            TariffTier::Comfort => &self.comfort,
            TariffTier::Business => &self.business,
        }
    }

    /// Uniformly random driver from the tier's roster; `None` if the roster
    /// is empty.
    pub fn random_driver<R: Rng>(&self, tier: TariffTier, rng: &mut R) -> Option<&Driver> {
        let drivers = self.drivers_for_tier(tier);
        if drivers.is_empty() {
            return None;
        }
        Some(&drivers[rng.gen_range(0..drivers.len())])
    }

    /// Unique car models for a tier, in first-seen directory order.
    pub fn distinct_car_models(&self, tier: TariffTier) -> Vec<String> {
        let mut models: Vec<String> = Vec::new();
        for driver in self.drivers_for_tier(tier) {
            if !models.iter().any(|model| model == &driver.car_model) {
                models.push(driver.car_model.clone());
            }
        }
        models
    }

    /// First driver in the tier whose car model matches exactly.
    pub fn driver_by_car_model(&self, tier: TariffTier, car_model: &str) -> Option<&Driver> {
        self.drivers_for_tier(tier)
            .iter()
            .find(|driver| driver.car_model == car_model)
    }
}

impl Default for DriverDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Driver selection randomness with an injectable seed.
#[derive(Resource)]
pub struct DriverPicker {
    rng: StdRng,
}

impl DriverPicker {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Pick a uniformly random driver for the tier from the directory.
    pub fn pick<'a>(
        &mut self,
        directory: &'a DriverDirectory,
        tier: TariffTier,
    ) -> Option<&'a Driver> {
        directory.random_driver(tier, &mut self.rng)
    }
}
