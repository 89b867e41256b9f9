//! Book one economy and one business ride end to end and print the history.
//!
//! Run with: cargo run -p taxi_core --example ride_demo
//!
//! Orders are forwarded to Telegram when the `telegram` feature is enabled
//! and TAXI_TELEGRAM_BOT_TOKEN / TAXI_TELEGRAM_CHAT_ID are set.

use bevy_ecs::prelude::World;
use taxi_core::booking::{
    complete_ride, current_ride_snapshot, request_ride, select_car_and_driver, RideRequest,
};
use taxi_core::clock::ONE_SEC_MS;
use taxi_core::drivers::DriverDirectory;
use taxi_core::history::{export_history_csv, RideHistory};
use taxi_core::notify::NotifierKind;
use taxi_core::pricing;
use taxi_core::profile::{save_session, session_file_path, UserProfile};
use taxi_core::runner::{booking_schedule, run_until_empty_with_hook};
use taxi_core::session::{build_session, SessionParams, SessionProfile};
use taxi_core::spatial::GeoPoint;
use taxi_core::tariff::TariffTier;

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let mut world = World::new();
    build_session(
        &mut world,
        SessionParams::default()
            .with_seed(42)
            .with_notifier(NotifierKind::from_env()),
    );

    let rider = match world.resource::<SessionProfile>().0.clone() {
        Some(profile) => {
            println!("Signed in as {} ({})", profile.name, profile.phone);
            profile
        }
        None => {
            let profile = UserProfile::new("Ivan Ivanov", "+7 (916) 123-45-67")
                .with_email("ivan@example.com");
            if let Ok(path) = session_file_path() {
                if let Err(error) = save_session(&path, &profile) {
                    eprintln!("could not save session: {error}");
                }
            }
            world.resource_mut::<SessionProfile>().0 = Some(profile.clone());
            println!("Registered {} ({})", profile.name, profile.phone);
            profile
        }
    };

    let pickup = GeoPoint::new(55.7558, 37.6173);
    let dropoff = GeoPoint::new(55.7658, 37.6273);

    println!("\n--- Quotes for Tverskaya 1 -> Arbat 10 ---");
    for tier in TariffTier::ALL {
        let quote = pricing::estimate(pickup, dropoff, tier);
        println!(
            "  {tier}: {:.2} RUB, driver in ~{} min",
            quote.fare, quote.eta_minutes
        );
    }

    println!("\n--- Economy ride ---");
    let quote = pricing::estimate(pickup, dropoff, TariffTier::Economy);
    let ride_id = request_ride(
        &mut world,
        RideRequest {
            requester: rider.clone(),
            pickup_address: "Tverskaya 1".to_string(),
            dropoff_address: "Arbat 10".to_string(),
            pickup,
            dropoff,
            tier: TariffTier::Economy,
            fare: quote.fare,
        },
    )
    .expect("no ride is active yet");
    println!("Requested ride {ride_id}");

    let mut schedule = booking_schedule();
    run_until_empty_with_hook(&mut world, &mut schedule, 16, print_step);

    let record = complete_ride(&mut world).expect("ride should be in progress");
    println!(
        "Completed with {} ({}), fare {:.2} RUB",
        record.driver_name.as_deref().unwrap_or("unknown"),
        record.driver_car_model.as_deref().unwrap_or("unknown"),
        record.fare
    );

    println!("\n--- Business ride: pick the car first ---");
    let models = world
        .resource::<DriverDirectory>()
        .distinct_car_models(TariffTier::Business);
    println!("Available cars: {}", models.join(", "));

    let quote = pricing::estimate(pickup, dropoff, TariffTier::Business);
    request_ride(
        &mut world,
        RideRequest {
            requester: rider,
            pickup_address: "Tverskaya 1".to_string(),
            dropoff_address: "Arbat 10".to_string(),
            pickup,
            dropoff,
            tier: TariffTier::Business,
            fare: quote.fare,
        },
    )
    .expect("slot is free again");

    let outcome = select_car_and_driver(&mut world, "BMW F90 M5");
    println!("Selected BMW F90 M5: {outcome:?}");
    run_until_empty_with_hook(&mut world, &mut schedule, 16, print_step);

    let record = complete_ride(&mut world).expect("ride should be in progress");
    println!(
        "Completed with {} ({}), fare {:.2} RUB",
        record.driver_name.as_deref().unwrap_or("unknown"),
        record.driver_car_model.as_deref().unwrap_or("unknown"),
        record.fare
    );

    let history = world.resource::<RideHistory>();
    println!("\n--- Ride history ({} rides, newest first) ---", history.len());
    for record in history.records() {
        println!(
            "  {:?}  {} -> {}  {}  {:.2} RUB  driver: {}",
            record.status,
            record.pickup_address,
            record.dropoff_address,
            record.tier,
            record.fare,
            record.driver_name.as_deref().unwrap_or("-"),
        );
    }

    let csv_path = std::path::Path::new("ride_history.csv");
    match export_history_csv(csv_path, history.records()) {
        Ok(()) => println!("Exported history to {}", csv_path.display()),
        Err(error) => eprintln!("csv export failed: {error}"),
    }
}

fn print_step(world: &World, event: &taxi_core::clock::Event) {
    let status = current_ride_snapshot(world)
        .map(|snapshot| format!("{:?}", snapshot.status))
        .unwrap_or_else(|| "gone".to_string());
    println!(
        "  t={:>2}s  {:?} -> {}",
        event.timestamp / ONE_SEC_MS,
        event.kind,
        status
    );
}
